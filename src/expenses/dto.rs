use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Category, Expense};

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct ExpenseOut {
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Expense> for ExpenseOut {
    fn from(e: Expense) -> Self {
        Self {
            expense_id: e.id,
            user_id: e.user_id,
            name: e.name,
            amount: e.amount,
            category: e.category,
            created_at: e.created_at,
        }
    }
}
