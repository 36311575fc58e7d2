//! Books repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateBook, UpdateBook},
};

use super::{BooksRepository, BOOK_NOT_FOUND};

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, availability FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, availability FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, availability)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, availability
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.availability)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_book(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                availability = COALESCE($4, availability)
            WHERE id = $1
            RETURNING id, title, author, availability
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(changes.availability)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        // borrows.book_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        }

        Ok(())
    }
}
