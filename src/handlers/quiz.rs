use axum::extract::{Path, Query, State};
use uuid::Uuid;

use super::found;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiJson, ApiResponse, ApiResult, AppError},
    grading,
    models::{
        AttemptsQuery, NewQuizAttempt, PublicQuiz, QuizAttempt, QuizDetail, QuizSubmissionResult,
        SubmitQuizRequest,
    },
    repository::Repository,
};

/// A quiz with all of its questions and choices, answers included.
pub(crate) async fn load_quiz_detail(
    repo: &dyn Repository,
    quiz_id: Uuid,
) -> Result<QuizDetail, AppError> {
    let quiz = found(repo.get_quiz(quiz_id).await?, "Quiz not found")?;
    let questions = repo.quiz_questions(quiz_id).await?;
    Ok(QuizDetail { quiz, questions })
}

/// get_quiz
///
/// [Public Route] The quiz for taking. Correct answers and explanations are withheld.
#[utoipa::path(
    get,
    path = "/api/quiz/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz", body = PublicQuiz),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> ApiResult<PublicQuiz> {
    let detail = load_quiz_detail(state.repo.as_ref(), quiz_id).await?;
    Ok(ApiResponse::ok(PublicQuiz::from(detail)))
}

/// submit_quiz
///
/// [Authenticated Route] Grades the submitted answers, stores the attempt and
/// returns per-question results in the requested locale.
#[utoipa::path(
    post,
    path = "/api/quiz/{quiz_id}/submit",
    params(("quiz_id" = Uuid, Path, description = "Quiz ID")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Graded attempt", body = QuizSubmissionResult),
        (status = 400, description = "Answer for a question outside the quiz"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn submit_quiz(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    ApiJson(payload): ApiJson<SubmitQuizRequest>,
) -> ApiResult<QuizSubmissionResult> {
    let QuizDetail { quiz, questions } = load_quiz_detail(state.repo.as_ref(), quiz_id).await?;
    let locale = payload.locale.unwrap_or_default();

    let grade = grading::grade_quiz(&quiz, &questions, &payload.answers, locale)?;

    let attempt = state
        .repo
        .record_attempt(NewQuizAttempt {
            user_id,
            quiz_id,
            score: grade.score,
            correct_answers: grade.correct_answers,
            total_questions: grade.total_questions,
            passed: grade.passed,
            answers: grade.answers,
        })
        .await?;

    tracing::info!(
        user_id = %user_id,
        quiz_id = %quiz_id,
        score = grade.score,
        passed = grade.passed,
        "Quiz attempt recorded"
    );

    Ok(ApiResponse::ok(QuizSubmissionResult {
        attempt_id: attempt.id,
        score: grade.score,
        correct_answers: grade.correct_answers,
        total_questions: grade.total_questions,
        passing_score: quiz.passing_score,
        passed: grade.passed,
        results: grade.results,
    }))
}

/// list_attempts
///
/// [Authenticated Route] The caller's attempts, newest first.
#[utoipa::path(
    get,
    path = "/api/quiz/attempts",
    params(AttemptsQuery),
    responses((status = 200, description = "Attempts", body = [QuizAttempt]))
)]
pub async fn list_attempts(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AttemptsQuery>,
) -> ApiResult<Vec<QuizAttempt>> {
    let attempts = state.repo.list_attempts(user_id, query.quiz_id).await?;
    Ok(ApiResponse::ok(attempts))
}
