//! Repository layer: the persistence boundary for books and borrows

pub mod books;
pub mod borrows;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, Borrow, CreateBook, NewBorrow, UpdateBook, UpdateBorrow},
};

pub const BOOK_NOT_FOUND: &str = "Book not found.";
pub const BORROW_NOT_FOUND: &str = "Borrow not found.";

/// Storage for catalog entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books, ordered by id
    async fn list_books(&self) -> AppResult<Vec<Book>>;

    async fn get_book(&self, id: i32) -> AppResult<Book>;

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book>;

    async fn update_book(&self, id: i32, changes: &UpdateBook) -> AppResult<Book>;

    /// Delete a book together with every borrow that references it
    async fn delete_book(&self, id: i32) -> AppResult<()>;
}

/// Storage for borrow records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowsRepository: Send + Sync {
    /// All borrows, ordered by id
    async fn list_borrows(&self) -> AppResult<Vec<Borrow>>;

    async fn get_borrow(&self, id: i32) -> AppResult<Borrow>;

    /// Mark the book unavailable and record the borrow as one unit.
    ///
    /// The flip only happens if the book is currently available; `None` means
    /// it was not (or no longer) available and nothing was written.
    async fn create_borrow_if_available(&self, borrow: &NewBorrow) -> AppResult<Option<Borrow>>;

    async fn update_borrow(&self, id: i32, changes: &UpdateBorrow) -> AppResult<Borrow>;

    /// Delete a borrow record. The book's availability is left as it is.
    async fn delete_borrow(&self, id: i32) -> AppResult<()>;
}

/// Main repository struct handing out the per-entity stores
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub books: Arc<dyn BooksRepository>,
    pub borrows: Arc<dyn BorrowsRepository>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            borrows: Arc::new(borrows::PgBorrowsRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryRepository::default();
        Self {
            pool: None,
            books: Arc::new(store.clone()),
            borrows: Arc::new(store),
        }
    }

    pub fn from_parts(books: Arc<dyn BooksRepository>, borrows: Arc<dyn BorrowsRepository>) -> Self {
        Self {
            pool: None,
            books,
            borrows,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(ref pool) = self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
