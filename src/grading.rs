//! Quiz scoring.
//!
//! Grading is a pure function of the stored questions and the submitted
//! answers; the handler persists the outcome.

use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::AppError,
    locale::Locale,
    models::{Choice, GradedAnswer, QuestionResult, QuestionWithChoices, Quiz, SubmittedAnswer},
};

/// QuizGrade
///
/// The outcome of grading one submission.
#[derive(Debug, Clone)]
pub struct QuizGrade {
    pub score: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub passed: bool,
    /// One entry per answered question, in submission order.
    pub answers: Vec<GradedAnswer>,
    /// One entry per question of the quiz, in quiz order.
    pub results: Vec<QuestionResult>,
}

/// Rounded percentage of `correct` over `total`. Zero when there is nothing to score.
pub fn percentage(correct: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as i32
}

/// grade_quiz
///
/// Scores `answers` against the questions of `quiz`.
///
/// * An answer naming a question outside the quiz is rejected (400).
/// * Only the first answer given for a question counts.
/// * An answer is correct when its choice belongs to the question and is the
///   correct one; a choice from another question is treated as wrong.
/// * Unanswered questions count as incorrect. A quiz without questions scores
///   0 and never passes.
pub fn grade_quiz(
    quiz: &Quiz,
    questions: &[QuestionWithChoices],
    answers: &[SubmittedAnswer],
    locale: Locale,
) -> Result<QuizGrade, AppError> {
    let mut chosen: HashMap<Uuid, Option<Uuid>> = HashMap::new();
    let mut order: Vec<Uuid> = Vec::new();

    for answer in answers {
        if !questions.iter().any(|q| q.question.id == answer.question_id) {
            return Err(AppError::bad_request(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            )));
        }
        if !chosen.contains_key(&answer.question_id) {
            chosen.insert(answer.question_id, answer.choice_id);
            order.push(answer.question_id);
        }
    }

    let mut correct_answers = 0;
    let mut graded: HashMap<Uuid, GradedAnswer> = HashMap::new();
    let mut results = Vec::with_capacity(questions.len());

    for entry in questions {
        let question = &entry.question;
        let correct_choice = entry.choices.iter().find(|c| c.is_correct);
        let user_choice: Option<&Choice> = chosen
            .get(&question.id)
            .copied()
            .flatten()
            .and_then(|choice_id| entry.choices.iter().find(|c| c.id == choice_id));
        let is_correct = user_choice.is_some_and(|c| c.is_correct);
        if is_correct {
            correct_answers += 1;
        }

        if chosen.contains_key(&question.id) {
            graded.insert(
                question.id,
                GradedAnswer {
                    question_id: question.id,
                    choice_id: user_choice.map(|c| c.id),
                    is_correct,
                },
            );
        }

        results.push(QuestionResult {
            question_id: question.id,
            question_text: locale
                .pick(&question.question_text_en, &question.question_text_tr)
                .to_string(),
            user_choice_id: user_choice.map(|c| c.id),
            user_choice_text: user_choice
                .map(|c| locale.pick(&c.choice_text_en, &c.choice_text_tr).to_string()),
            correct_choice_id: correct_choice.map(|c| c.id),
            correct_choice_text: correct_choice
                .map(|c| locale.pick(&c.choice_text_en, &c.choice_text_tr).to_string()),
            is_correct,
            explanation: locale.pick_opt(
                question.explanation_en.as_deref(),
                question.explanation_tr.as_deref(),
            ),
        });
    }

    let total_questions = questions.len() as i32;
    let score = percentage(correct_answers, total_questions);
    let passed = total_questions > 0 && score >= quiz.passing_score;

    Ok(QuizGrade {
        score,
        correct_answers,
        total_questions,
        passed,
        answers: order
            .into_iter()
            .filter_map(|id| graded.remove(&id))
            .collect(),
        results,
    })
}
