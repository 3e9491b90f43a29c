use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::get_questions_excluding, Question},
    server::{
        app::AppState,
        deserializers::{deserialize_optional_i64, Object},
        error::ApiError,
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

// The client also sends the category label as `type`; only the id matters.
#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    id: Option<i64>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

/// Picks a random question the player has not seen yet. Category `0` means
/// every category.
async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<Object<QuizRequest>>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(Object(body)) = body?;
    let category = body
        .quiz_category
        .ok_or_else(|| ApiError::missing_field("quiz_category"))?
        .id
        .ok_or_else(|| ApiError::missing_field("quiz_category.id"))?;
    let previous = body.previous_questions.unwrap_or_default();

    let candidates = get_questions_excluding(&pool, &previous, Some(category))
        .await
        .map_err(ApiError::internal)?;
    let question = candidates.choose(&mut rand::rng()).cloned();

    match &question {
        Some(question) => {
            let label = if category == 0 {
                "all".to_string()
            } else {
                category.to_string()
            };
            QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            tracing::debug!("Serving quiz question {}", question.id);
        }
        None => tracing::debug!(
            "No quiz questions left in category {category} after {} asked",
            previous.len()
        ),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
