use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{error::AppError, locale::Locale};

pub const DEFAULT_PASSING_SCORE: i32 = 70;

// --- Core Quiz Schemas (Mapped to Database) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Quiz {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    /// Minimum percentage (0-100) needed to pass.
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text_en: String,
    pub question_text_tr: String,
    pub explanation_en: Option<String>,
    pub explanation_tr: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Choice {
    pub id: Uuid,
    pub question_id: Uuid,
    pub choice_text_en: String,
    pub choice_text_tr: String,
    pub is_correct: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub passed: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct QuizAnswer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub choice_id: Option<Uuid>,
    pub is_correct: bool,
}

// --- Composite Views ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct QuizSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub quiz: Quiz,
    pub question_count: i64,
}

/// A question with all of its choices, correct answers included.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuestionWithChoices {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// QuizDetail
///
/// The admin view of a quiz, answers included.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithChoices>,
}

/// A choice as shown to a learner taking the quiz. Carries no `is_correct`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicChoice {
    pub id: Uuid,
    pub choice_text_en: String,
    pub choice_text_tr: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text_en: String,
    pub question_text_tr: String,
    pub position: i32,
    pub choices: Vec<PublicChoice>,
}

/// PublicQuiz
///
/// The quiz as served for taking. Explanations and correct answers are only
/// revealed in the submission result.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}

impl From<QuizDetail> for PublicQuiz {
    fn from(detail: QuizDetail) -> Self {
        let questions = detail
            .questions
            .into_iter()
            .map(|q| PublicQuestion {
                id: q.question.id,
                question_text_en: q.question.question_text_en,
                question_text_tr: q.question.question_text_tr,
                position: q.question.position,
                choices: q
                    .choices
                    .into_iter()
                    .map(|c| PublicChoice {
                        id: c.id,
                        choice_text_en: c.choice_text_en,
                        choice_text_tr: c.choice_text_tr,
                        position: c.position,
                    })
                    .collect(),
            })
            .collect();
        Self {
            quiz: detail.quiz,
            questions,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateChoiceRequest {
    pub choice_text_en: String,
    pub choice_text_tr: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateQuestionRequest {
    pub question_text_en: String,
    pub question_text_tr: String,
    pub explanation_en: Option<String>,
    pub explanation_tr: Option<String>,
    pub choices: Vec<CreateChoiceRequest>,
}

/// CreateQuizRequest
///
/// Creates a quiz with its questions and choices in one go. Questions and
/// choices are positioned in the order they are given.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateQuizRequest {
    pub topic_id: Option<Uuid>,
    pub title_en: String,
    pub title_tr: String,
    pub description_en: Option<String>,
    pub description_tr: Option<String>,
    pub passing_score: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub questions: Vec<CreateQuestionRequest>,
}

fn validate_passing_score(score: Option<i32>) -> Result<(), AppError> {
    match score {
        Some(s) if !(0..=100).contains(&s) => Err(AppError::bad_request(
            "passing_score must be between 0 and 100",
        )),
        _ => Ok(()),
    }
}

fn validate_time_limit(minutes: Option<i32>) -> Result<(), AppError> {
    match minutes {
        Some(m) if m <= 0 => Err(AppError::bad_request("time_limit_minutes must be positive")),
        _ => Ok(()),
    }
}

impl CreateQuizRequest {
    /// Validates the payload and returns the parent topic id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let topic_id = self
            .topic_id
            .ok_or_else(|| AppError::bad_request("Missing required field: topic_id"))?;
        if self.title_en.trim().is_empty() || self.title_tr.trim().is_empty() {
            return Err(AppError::bad_request("Missing required field: title"));
        }
        validate_passing_score(self.passing_score)?;
        validate_time_limit(self.time_limit_minutes)?;

        for (index, question) in self.questions.iter().enumerate() {
            let number = index + 1;
            if question.question_text_en.trim().is_empty() {
                return Err(AppError::bad_request(format!(
                    "Question {number} is missing its text"
                )));
            }
            if question.choices.len() < 2 {
                return Err(AppError::bad_request(format!(
                    "Question {number} needs at least two choices"
                )));
            }
            if question.choices.iter().any(|c| c.choice_text_en.trim().is_empty()) {
                return Err(AppError::bad_request(format!(
                    "Question {number} has a choice without text"
                )));
            }
            let correct = question.choices.iter().filter(|c| c.is_correct).count();
            if correct != 1 {
                return Err(AppError::bad_request(format!(
                    "Question {number} must have exactly one correct choice"
                )));
            }
        }
        Ok(topic_id)
    }
}

/// Metadata-only update; questions are managed by recreating the quiz.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateQuizRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_tr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<i32>,
}

impl UpdateQuizRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_passing_score(self.passing_score)?;
        validate_time_limit(self.time_limit_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub choice_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct SubmitQuizRequest {
    pub answers: Vec<SubmittedAnswer>,
    /// Language of the rendered result texts. Defaults to English.
    pub locale: Option<Locale>,
}

// --- Grading Output ---

/// One graded answer, as persisted alongside the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub choice_id: Option<Uuid>,
    pub is_correct: bool,
}

/// Attempt row plus its answers, ready to be persisted in one transaction.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub question_text: String,
    pub user_choice_id: Option<Uuid>,
    pub user_choice_text: Option<String>,
    pub correct_choice_id: Option<Uuid>,
    pub correct_choice_text: Option<String>,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuizSubmissionResult {
    pub attempt_id: Uuid,
    pub score: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub passing_score: i32,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct AttemptsQuery {
    /// Restrict the listing to one quiz.
    pub quiz_id: Option<Uuid>,
}
