//! Borrowing service: borrow records and the availability rule

use crate::{
    error::{AppError, AppResult},
    models::{Borrow, CreateBorrow, NewBorrow, UpdateBorrow, UserClaims},
    repository::{Repository, BOOK_NOT_FOUND},
};

pub const BOOK_NOT_AVAILABLE: &str = "Book is not available for borrowing.";
pub const DUE_DATE_REQUIRED: &str = "due_date: This field is required.";

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every borrow record, whoever the borrower is
    pub async fn list_borrows(&self) -> AppResult<Vec<Borrow>> {
        self.repository.borrows.list_borrows().await
    }

    pub async fn get_borrow(&self, id: i32) -> AppResult<Borrow> {
        self.repository.borrows.get_borrow(id).await
    }

    /// Borrow a book on behalf of `borrower`.
    ///
    /// The borrower always comes from the caller's claims. The availability
    /// flip and the insert are a single storage operation; losing a race to
    /// another borrower is reported exactly like an unavailable book, and a
    /// book deleted in the meantime as a missing one.
    pub async fn create_borrow(&self, borrower: &UserClaims, request: CreateBorrow) -> AppResult<Borrow> {
        let due_date = request
            .due_date
            .ok_or_else(|| AppError::Validation(DUE_DATE_REQUIRED.to_string()))?;
        let book_id = request
            .book
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        let book = self.repository.books.get_book(book_id).await?;
        if !book.availability {
            tracing::warn!(book_id, user_id = borrower.user_id, "borrow refused: book unavailable");
            return Err(AppError::InvalidState(BOOK_NOT_AVAILABLE.to_string()));
        }

        let new_borrow = NewBorrow {
            user_id: borrower.user_id,
            book_id,
            due_date,
        };

        let Some(borrow) = self
            .repository
            .borrows
            .create_borrow_if_available(&new_borrow)
            .await?
        else {
            // Nothing was flipped: the book was either taken or deleted meanwhile
            self.repository.books.get_book(book_id).await?;
            tracing::warn!(book_id, user_id = borrower.user_id, "borrow refused: lost availability race");
            return Err(AppError::InvalidState(BOOK_NOT_AVAILABLE.to_string()));
        };

        tracing::info!(
            borrow_id = borrow.id,
            book_id,
            user_id = borrower.user_id,
            due_date = %borrow.due_date,
            "book borrowed"
        );

        Ok(borrow)
    }

    /// Change the due date of a borrow
    pub async fn update_borrow(&self, id: i32, changes: UpdateBorrow) -> AppResult<Borrow> {
        let updated = self.repository.borrows.update_borrow(id, &changes).await?;
        tracing::info!(borrow_id = id, due_date = %updated.due_date, "borrow updated");
        Ok(updated)
    }

    /// Delete a borrow record. The book stays unavailable.
    pub async fn delete_borrow(&self, id: i32) -> AppResult<()> {
        self.repository.borrows.delete_borrow(id).await?;
        tracing::info!(borrow_id = id, "borrow deleted");
        Ok(())
    }
}
