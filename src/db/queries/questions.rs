use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

const SELECT_QUESTIONS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

pub async fn get_all_questions(pool: &SqlitePool) -> StoreResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(&format!("{SELECT_QUESTIONS} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(questions)
}

pub async fn count_questions(pool: &SqlitePool) -> StoreResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> StoreResult<Option<Question>> {
    let question = sqlx::query_as::<_, Question>(&format!("{SELECT_QUESTIONS} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> StoreResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(&format!(
        "{SELECT_QUESTIONS} WHERE category = ?1 ORDER BY id"
    ))
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// Case-insensitive substring search over the question text, compared on
/// Unicode lowercase.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> StoreResult<Vec<Question>> {
    let needle = term.to_lowercase();
    let questions = get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect();
    Ok(questions)
}

/// Questions whose id is not in `excluded`. A non-zero `category` further
/// restricts the result to that category.
pub async fn get_questions_excluding(
    pool: &SqlitePool,
    excluded: &[i64],
    category: Option<i64>,
) -> StoreResult<Vec<Question>> {
    let candidates = match category.filter(|id| *id != 0) {
        Some(category) => get_questions_for_category(pool, category).await?,
        None => get_all_questions(pool).await?,
    };
    // the history can outgrow SQLite's bound parameter limit
    let excluded: HashSet<i64> = excluded.iter().copied().collect();
    Ok(candidates
        .into_iter()
        .filter(|q| !excluded.contains(&q.id))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, new: &NewQuestion) -> StoreResult<Question> {
    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new.question)
    .bind(&new.answer)
    .bind(new.category)
    .bind(new.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_question_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let deleted = sqlx::query("DELETE FROM questions WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Inserts questions keeping their ids, replacing rows that already exist.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT OR REPLACE INTO questions (id, question, answer, category, difficulty)
VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}
