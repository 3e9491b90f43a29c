use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::StoreResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> StoreResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
SELECT id, "type"
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Inserts categories keeping their ids, replacing rows that already exist.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for category in categories {
        sqlx::query(r#"INSERT OR REPLACE INTO categories (id, "type") VALUES (?1, ?2)"#)
            .bind(category.id)
            .bind(&category.kind)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
