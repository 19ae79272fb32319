use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::StoreError;

/// Closed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Utilities,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category `{s}`"))
    }
}

/// Expense as handed out by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub created_at: OffsetDateTime,
}

/// Raw `expenses` row; the category column is plain text.
#[derive(Debug, FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = StoreError;

    fn try_from(r: ExpenseRow) -> Result<Self, Self::Error> {
        let category = r.category.parse::<Category>().map_err(StoreError::Corrupt)?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            amount: r.amount,
            category,
            created_at: r.created_at,
        })
    }
}

/// Fields needed to insert an expense. `created_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: Category,
}
