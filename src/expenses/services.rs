use tracing::{debug, info};
use uuid::Uuid;

use super::{
    filters::{ExpenseFilter, ExpenseQuery},
    repo_types::{Expense, NewExpense},
    totals::Totals,
};
use crate::{error::ApiError, store::Store, users::repo_types::User};

async fn require_user(store: &dyn Store, user_id: Uuid) -> Result<User, ApiError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)
}

/// Rejects empty names and amounts that are not strictly positive.
pub fn validate(new: &NewExpense) -> Result<(), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::Validation("Expense name must not be empty".into()));
    }
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be greater than 0".into()));
    }
    Ok(())
}

pub async fn create_expense(store: &dyn Store, new: NewExpense) -> Result<Expense, ApiError> {
    validate(&new)?;
    require_user(store, new.user_id).await?;
    let expense = store.create_expense(new).await?;
    info!(
        expense_id = %expense.id,
        user_id = %expense.user_id,
        amount = expense.amount,
        category = %expense.category,
        "expense created"
    );
    Ok(expense)
}

pub async fn list_expenses(
    store: &dyn Store,
    user_id: Uuid,
    query: &ExpenseQuery,
) -> Result<Vec<Expense>, ApiError> {
    require_user(store, user_id).await?;
    let filter = ExpenseFilter::from_query(query)?;
    debug!(%user_id, ?filter, "listing expenses");
    Ok(store.list_expenses(user_id, &filter).await?)
}

pub async fn totals_for(store: &dyn Store, user_id: Uuid) -> Result<Totals, ApiError> {
    let user = require_user(store, user_id).await?;
    let sums = store.category_sums(user_id).await?;
    Ok(Totals::compute(user.salary, sums))
}
