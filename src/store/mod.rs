use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::expenses::{
    filters::ExpenseFilter,
    repo_types::{Category, Expense, NewExpense},
};
use crate::users::repo_types::{NewUser, User};

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username `{0}` already exists")]
    DuplicateUsername(String),
    #[error("user {0} does not exist")]
    MissingUser(Uuid),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Durable storage for users and their expenses.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `DuplicateUsername` if the name is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `MissingUser` if `new.user_id` does not resolve.
    async fn create_expense(&self, new: NewExpense) -> Result<Expense, StoreError>;

    /// Expenses of `user_id` matching `filter`, oldest first.
    async fn list_expenses(
        &self,
        user_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError>;

    /// Summed amount per category for `user_id`; categories without expenses are absent.
    async fn category_sums(&self, user_id: Uuid) -> Result<Vec<(Category, f64)>, StoreError>;
}
