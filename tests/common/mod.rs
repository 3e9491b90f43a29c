#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use trivia_api::db::queries::categories::import_categories;
use trivia_api::db::queries::questions::import_questions;
use trivia_api::db::{establish_in_memory, run_migrations, Category, Question};
use trivia_api::server::app::{build_router, AppState};

pub const CATEGORIES: [(i64, &str); 6] = [
    (1, "Science"),
    (2, "Art"),
    (3, "Geography"),
    (4, "History"),
    (5, "Entertainment"),
    (6, "Sports"),
];

// (id, question, answer, category, difficulty)
pub const QUESTIONS: [(i64, &str, &str, i64, i64); 14] = [
    (1, "What is the heaviest organ in the human body?", "The Liver", 1, 4),
    (2, "Who discovered penicillin?", "Alexander Fleming", 1, 3),
    (3, "Hematology is a branch of medicine involving the study of what?", "Blood", 1, 4),
    (4, "La Giaconda is better known as what?", "Mona Lisa", 2, 3),
    (5, "How many paintings did Van Gogh sell in his lifetime?", "One", 2, 4),
    (6, "What is the largest lake in Africa?", "Lake Victoria", 3, 2),
    (7, "The Taj Mahal is located in which Indian city?", "Agra", 3, 2),
    (8, "In which royal palace would you find the Hall of Mirrors?", "The Palace of Versailles", 3, 3),
    (9, "Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
    (10, "What boxer's original name is Cassius Clay?", "Muhammad Ali", 4, 1),
    (11, "Who invented Peanut Butter?", "George Washington Carver", 4, 2),
    (12, "What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 5, 4),
    (13, "Which is the only team to play in every soccer World Cup tournament?", "Brazil", 6, 3),
    (14, "Which country won the first ever soccer World Cup in 1930?", "Uruguay", 6, 4),
];

pub async fn empty_pool() -> SqlitePool {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let pool = establish_in_memory()
        .await
        .expect("Failed to open in-memory database");
    run_migrations(&pool).await.expect("Failed to migrate");
    pool
}

pub async fn seeded_pool() -> SqlitePool {
    let pool = empty_pool().await;
    import_categories(
        &pool,
        CATEGORIES
            .iter()
            .map(|(id, kind)| Category {
                id: *id,
                kind: kind.to_string(),
            })
            .collect(),
    )
    .await
    .expect("Failed to seed categories");
    import_questions(
        &pool,
        QUESTIONS
            .iter()
            .map(|(id, question, answer, category, difficulty)| Question {
                id: *id,
                question: question.to_string(),
                answer: answer.to_string(),
                category: *category,
                difficulty: *difficulty,
            })
            .collect(),
    )
    .await
    .expect("Failed to seed questions");
    pool
}

pub async fn create_test_app() -> (Router, SqlitePool) {
    let pool = seeded_pool().await;
    (build_router(AppState::new(pool.clone())), pool)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        json,
    }
}

pub fn ids(json: &Value) -> Vec<i64> {
    json["questions"]
        .as_array()
        .expect("questions should be an array")
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}
