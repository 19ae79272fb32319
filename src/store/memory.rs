use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::expenses::{
    filters::ExpenseFilter,
    repo_types::{Category, Expense, NewExpense},
    totals::category_sums,
};
use crate::users::repo_types::{NewUser, User};

type Clock = Box<dyn Fn() -> OffsetDateTime + Send + Sync>;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    expenses: Vec<Expense>,
}

/// Process-local store. Username uniqueness is checked under the write lock.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }

    /// Stamps new expenses with `clock()` instead of the wall clock.
    pub fn with_clock(clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock: Box::new(clock),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::DuplicateUsername(new.username));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            salary: new.salary,
            password_hash: new.password_hash,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_expense(&self, new: NewExpense) -> Result<Expense, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == new.user_id) {
            return Err(StoreError::MissingUser(new.user_id));
        }
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name,
            amount: new.amount,
            category: new.category,
            created_at: (self.clock)(),
        };
        t.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = filter.apply(t.expenses.iter().filter(|e| e.user_id == user_id));
        rows.sort_by_key(|e| (e.created_at, e.id));
        Ok(rows)
    }

    async fn category_sums(&self, user_id: Uuid) -> Result<Vec<(Category, f64)>, StoreError> {
        let t = self.tables.read().await;
        Ok(category_sums(
            t.expenses.iter().filter(|e| e.user_id == user_id),
        ))
    }
}
