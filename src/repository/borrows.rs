//! Borrows repository for PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Borrow, NewBorrow, UpdateBorrow},
};

use super::{BorrowsRepository, BORROW_NOT_FOUND};

#[derive(Clone)]
pub struct PgBorrowsRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowsRepository for PgBorrowsRepository {
    async fn list_borrows(&self) -> AppResult<Vec<Borrow>> {
        let borrows = sqlx::query_as::<_, Borrow>(
            "SELECT id, user_id, book_id, borrowed_at, due_date FROM borrows ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(borrows)
    }

    async fn get_borrow(&self, id: i32) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>(
            "SELECT id, user_id, book_id, borrowed_at, due_date FROM borrows WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))
    }

    async fn create_borrow_if_available(&self, borrow: &NewBorrow) -> AppResult<Option<Borrow>> {
        let mut tx = self.pool.begin().await?;

        // Conditional flip: only one concurrent caller can see a row change here
        let flipped = sqlx::query(
            "UPDATE books SET availability = FALSE WHERE id = $1 AND availability = TRUE",
        )
        .bind(borrow.book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flipped != 1 {
            tx.rollback().await?;
            return Ok(None);
        }

        let created = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, book_id, borrowed_at, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, book_id, borrowed_at, due_date
            "#,
        )
        .bind(borrow.user_id)
        .bind(borrow.book_id)
        .bind(Utc::now())
        .bind(borrow.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(created))
    }

    async fn update_borrow(&self, id: i32, changes: &UpdateBorrow) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET due_date = COALESCE($2, due_date)
            WHERE id = $1
            RETURNING id, user_id, book_id, borrowed_at, due_date
            "#,
        )
        .bind(id)
        .bind(changes.due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))
    }

    async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(BORROW_NOT_FOUND.to_string()));
        }

        Ok(())
    }
}
