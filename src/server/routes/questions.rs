use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_optional_i64, Object},
        error::ApiError,
        pagination::{paginate, Page},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::categories_by_id, ApiResponse};

/// Body of `POST /questions`: either a search or a new question.
#[derive(Deserialize)]
struct QuestionsBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    difficulty: Option<i64>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    deleted_id: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum QuestionsPostResponse {
    Search {
        success: bool,
        questions: Vec<Question>,
        total_questions: i64,
        current_category: Option<i64>,
    },
    Created {
        success: bool,
        created_id: i64,
        questions: Vec<Question>,
        total_questions: i64,
    },
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_field(field))
}

fn required_number(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    value
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::missing_field(field))
}

impl QuestionsBody {
    /// Checks the fields in a fixed order and names the first one missing.
    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        Ok(NewQuestion {
            question: required_text(self.question, "question")?,
            answer: required_text(self.answer, "answer")?,
            category: required_number(self.category, "category")?,
            difficulty: required_number(self.difficulty, "difficulty")?,
        })
    }
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    page: Page,
) -> ApiResponse<Json<QuestionsPage>> {
    let selection = questions::get_all_questions(&pool)
        .await
        .map_err(ApiError::internal)?;
    let current = paginate(page, &selection);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }

    let categories = get_all_categories(&pool).await.map_err(ApiError::internal)?;
    Ok(Json(QuestionsPage {
        success: true,
        questions: current,
        total_questions: selection.len() as i64,
        categories: categories_by_id(categories),
        current_category: None,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    page: Page,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<DeletedQuestion>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    match questions::get_question_by_id(&pool, id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::info!("Question {id} does not exist, nothing to delete");
            return Err(ApiError::Unprocessable);
        }
        Err(err) => return Err(ApiError::unprocessable(err)),
    }
    questions::delete_question(&pool, id)
        .await
        .map_err(ApiError::unprocessable)?;
    QUESTIONS_DELETED.inc();

    let selection = questions::get_all_questions(&pool)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(DeletedQuestion {
        success: true,
        deleted_id: id,
        questions: paginate(page, &selection),
        total_questions: selection.len() as i64,
    }))
}

async fn create_or_search_questions(
    State(pool): State<SqlitePool>,
    page: Page,
    body: Result<Json<Object<QuestionsBody>>, JsonRejection>,
) -> ApiResponse<Json<QuestionsPostResponse>> {
    let Json(Object(mut body)) = body?;

    if let Some(term) = body.search_term.take().filter(|t| !t.is_empty()) {
        return search(&pool, page, &term).await.map(Json);
    }

    let new_question = body.into_new_question()?;
    let created = questions::create_question(&pool, &new_question)
        .await
        .map_err(ApiError::unprocessable)?;
    QUESTIONS_CREATED.inc();
    tracing::info!("Created question {}", created.id);

    let selection = questions::get_all_questions(&pool)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(QuestionsPostResponse::Created {
        success: true,
        created_id: created.id,
        questions: paginate(page, &selection),
        total_questions: selection.len() as i64,
    }))
}

async fn search(pool: &SqlitePool, page: Page, term: &str) -> ApiResponse<QuestionsPostResponse> {
    let matches = questions::search_questions(pool, term)
        .await
        .map_err(ApiError::unprocessable)?;
    let total_questions = questions::count_questions(pool)
        .await
        .map_err(ApiError::unprocessable)?;

    Ok(QuestionsPostResponse::Search {
        success: true,
        questions: paginate(page, &matches),
        total_questions,
        current_category: None,
    })
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions).post(create_or_search_questions),
        )
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
