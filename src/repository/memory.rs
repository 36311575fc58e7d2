//! In-process repository used for development and tests

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Book, Borrow, CreateBook, NewBorrow, UpdateBook, UpdateBorrow},
};

use super::{BooksRepository, BorrowsRepository, BOOK_NOT_FOUND, BORROW_NOT_FOUND};

#[derive(Default)]
struct MemoryState {
    books: BTreeMap<i32, Book>,
    borrows: BTreeMap<i32, Borrow>,
    last_book_id: i32,
    last_borrow_id: i32,
}

/// Books and borrows behind one lock, so multi-entity writes are atomic
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

#[async_trait]
impl BooksRepository for MemoryRepository {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.state.read().await.books.values().cloned().collect())
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.state
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        state.last_book_id += 1;
        let created = Book {
            id: state.last_book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            availability: book.availability,
        };
        state.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        let book = state
            .books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;
        changes.apply_to(book);
        Ok(book.clone())
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.books.remove(&id).is_none() {
            return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
        }
        state.borrows.retain(|_, borrow| borrow.book_id != id);
        Ok(())
    }
}

#[async_trait]
impl BorrowsRepository for MemoryRepository {
    async fn list_borrows(&self) -> AppResult<Vec<Borrow>> {
        Ok(self.state.read().await.borrows.values().cloned().collect())
    }

    async fn get_borrow(&self, id: i32) -> AppResult<Borrow> {
        self.state
            .read()
            .await
            .borrows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))
    }

    async fn create_borrow_if_available(&self, borrow: &NewBorrow) -> AppResult<Option<Borrow>> {
        let mut state = self.state.write().await;

        match state.books.get_mut(&borrow.book_id) {
            Some(book) if book.availability => book.availability = false,
            _ => return Ok(None),
        }

        state.last_borrow_id += 1;
        let created = Borrow {
            id: state.last_borrow_id,
            user_id: borrow.user_id,
            book_id: borrow.book_id,
            borrowed_at: Utc::now(),
            due_date: borrow.due_date,
        };
        state.borrows.insert(created.id, created.clone());

        Ok(Some(created))
    }

    async fn update_borrow(&self, id: i32, changes: &UpdateBorrow) -> AppResult<Borrow> {
        let mut state = self.state.write().await;
        let borrow = state
            .borrows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))?;
        if let Some(due_date) = changes.due_date {
            borrow.due_date = due_date;
        }
        Ok(borrow.clone())
    }

    async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        self.state
            .write()
            .await
            .borrows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tokio_test::{assert_err, assert_ok};

    fn new_book(title: &str, availability: bool) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Author".to_string(),
            availability,
        }
    }

    fn new_borrow(user_id: i32, book_id: i32) -> NewBorrow {
        NewBorrow {
            user_id,
            book_id,
            due_date: Utc.with_ymd_and_hms(2023, 10, 20, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let repo = MemoryRepository::default();
        let first = assert_ok!(repo.create_book(&new_book("One", true)).await);
        let second = assert_ok!(repo.create_book(&new_book("Two", true)).await);
        assert_eq!((first.id, second.id), (1, 2));
        let titles: Vec<_> = assert_ok!(repo.list_books().await)
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["One", "Two"]);
    }

    #[tokio::test]
    async fn borrow_flips_availability_once() {
        let repo = MemoryRepository::default();
        let book = assert_ok!(repo.create_book(&new_book("Single copy", true)).await);

        let borrow = assert_ok!(repo.create_borrow_if_available(&new_borrow(5, book.id)).await)
            .expect("first borrow succeeds");
        assert_eq!(borrow.user_id, 5);
        assert!(borrow.borrowed_at <= Utc::now() + Duration::seconds(1));
        assert!(!assert_ok!(repo.get_book(book.id).await).availability);

        let again = assert_ok!(repo.create_borrow_if_available(&new_borrow(6, book.id)).await);
        assert!(again.is_none());
        assert_eq!(assert_ok!(repo.list_borrows().await).len(), 1);
    }

    #[tokio::test]
    async fn borrow_of_missing_book_writes_nothing() {
        let repo = MemoryRepository::default();
        let outcome = assert_ok!(repo.create_borrow_if_available(&new_borrow(1, 42)).await);
        assert!(outcome.is_none());
        assert!(assert_ok!(repo.list_borrows().await).is_empty());
    }

    #[tokio::test]
    async fn deleting_a_borrow_keeps_book_unavailable() {
        let repo = MemoryRepository::default();
        let book = assert_ok!(repo.create_book(&new_book("Kept", true)).await);
        let borrow = assert_ok!(repo.create_borrow_if_available(&new_borrow(1, book.id)).await).unwrap();

        assert_ok!(repo.delete_borrow(borrow.id).await);
        assert_err!(repo.get_borrow(borrow.id).await);
        assert!(!assert_ok!(repo.get_book(book.id).await).availability);
    }

    #[tokio::test]
    async fn deleting_a_book_cascades_to_its_borrows() {
        let repo = MemoryRepository::default();
        let gone = assert_ok!(repo.create_book(&new_book("Gone", true)).await);
        let kept = assert_ok!(repo.create_book(&new_book("Kept", true)).await);
        assert_ok!(repo.create_borrow_if_available(&new_borrow(1, gone.id)).await);
        assert_ok!(repo.create_borrow_if_available(&new_borrow(1, kept.id)).await);

        assert_ok!(repo.delete_book(gone.id).await);
        let remaining = assert_ok!(repo.list_borrows().await);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].book_id, kept.id);
        assert!(matches!(repo.delete_book(gone.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_borrow_only_touches_due_date() {
        let repo = MemoryRepository::default();
        let book = assert_ok!(repo.create_book(&new_book("Due", true)).await);
        let borrow = assert_ok!(repo.create_borrow_if_available(&new_borrow(3, book.id)).await).unwrap();
        let later = Utc.with_ymd_and_hms(2023, 11, 1, 10, 0, 0).unwrap();

        let updated = assert_ok!(
            repo.update_borrow(borrow.id, &UpdateBorrow { due_date: Some(later) })
                .await
        );
        assert_eq!(updated.due_date, later);
        assert_eq!(updated.user_id, 3);
        assert_eq!(updated.borrowed_at, borrow.borrowed_at);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_borrows_of_one_book_yield_one_record() {
        let repo = MemoryRepository::default();
        let book_id = assert_ok!(repo.create_book(&new_book("Contended", true)).await).id;

        let handles: Vec<_> = (0..32)
            .map(|user_id| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_borrow_if_available(&new_borrow(user_id, book_id)).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if assert_ok!(handle.await.unwrap()).is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(assert_ok!(repo.list_borrows().await).len(), 1);
    }
}
