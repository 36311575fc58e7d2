//! Catalog management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_books().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_book(id).await
    }

    /// Create a new book; availability defaults to `true`
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.books.create_book(&book).await?;
        tracing::info!(book_id = created.id, availability = created.availability, "book created");
        Ok(created)
    }

    /// Update the given fields of a book.
    ///
    /// This is also the only way a borrowed book becomes available again.
    pub async fn update_book(&self, id: i32, changes: UpdateBook) -> AppResult<Book> {
        changes.validate()?;
        let updated = self.repository.books.update_book(id, &changes).await?;
        tracing::info!(book_id = id, availability = updated.availability, "book updated");
        Ok(updated)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete_book(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        repository::{MockBooksRepository, MockBorrowsRepository},
    };
    use std::sync::Arc;

    fn service(books: MockBooksRepository) -> CatalogService {
        CatalogService::new(Repository::from_parts(
            Arc::new(books),
            Arc::new(MockBorrowsRepository::new()),
        ))
    }

    #[tokio::test]
    async fn invalid_book_never_reaches_storage() {
        let mut books = MockBooksRepository::new();
        books.expect_create_book().never();

        let result = service(books)
            .create_book(CreateBook {
                title: "x".repeat(256),
                author: "Author".into(),
                availability: true,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn empty_author_in_update_is_rejected() {
        let mut books = MockBooksRepository::new();
        books.expect_update_book().never();

        let result = service(books)
            .update_book(
                1,
                UpdateBook {
                    author: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_passes_fields_through() {
        let mut books = MockBooksRepository::new();
        books
            .expect_create_book()
            .withf(|b: &CreateBook| b.title == "Dune" && b.availability)
            .times(1)
            .returning(|b| {
                Ok(Book {
                    id: 1,
                    title: b.title.clone(),
                    author: b.author.clone(),
                    availability: b.availability,
                })
            });

        let created = service(books)
            .create_book(CreateBook {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                availability: true,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
    }
}
