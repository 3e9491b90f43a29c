use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        Category, Question,
    },
    server::{app::AppState, error::ApiError, pagination::paginate, pagination::Page},
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
    total_categories: usize,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: i64,
}

/// Categories keyed by id, the shape the client renders its sidebar from.
pub(super) fn categories_by_id(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = get_all_categories(&pool).await.map_err(ApiError::internal)?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }

    let total_categories = categories.len();
    Ok(Json(CategoriesResponse {
        success: true,
        categories: categories_by_id(categories),
        total_categories,
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    page: Page,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<CategoryQuestions>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    let selection = questions::get_questions_for_category(&pool, id)
        .await
        .map_err(ApiError::internal)?;
    let current = paginate(page, &selection);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(CategoryQuestions {
        success: true,
        questions: current,
        total_questions: questions::count_questions(&pool)
            .await
            .map_err(ApiError::internal)?,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
