//! Data models for the lending server

pub mod book;
pub mod borrow;
pub mod permission;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use borrow::{Borrow, CreateBorrow, NewBorrow, UpdateBorrow};
pub use permission::{Action, Requirement, Resource};
pub use user::{AccountType, Caller, UserClaims};
