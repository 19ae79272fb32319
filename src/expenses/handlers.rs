use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateExpenseRequest, ExpenseOut},
    filters::ExpenseQuery,
    repo_types::NewExpense,
    services,
    totals::Totals,
};
use crate::{error::ApiError, state::AppState};

pub fn expenses_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense))
        .route("/expenses/", post(create_expense))
        .route("/expenses/:user_id", get(list_expenses))
        .route("/expenses/:user_id/", get(list_expenses))
}

pub fn totals_routes() -> Router<AppState> {
    Router::new()
        .route("/totals/:user_id", get(get_totals))
        .route("/totals/:user_id/", get(get_totals))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<Json<ExpenseOut>, ApiError> {
    let Json(body) = payload?;
    let expense = services::create_expense(
        state.store.as_ref(),
        NewExpense {
            user_id: body.user_id,
            name: body.name,
            amount: body.amount,
            category: body.category,
        },
    )
    .await?;
    Ok(Json(expense.into()))
}

#[instrument(skip(state, path, query))]
pub async fn list_expenses(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseOut>>, ApiError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let expenses = services::list_expenses(state.store.as_ref(), user_id, &query).await?;
    Ok(Json(expenses.into_iter().map(ExpenseOut::from).collect()))
}

#[instrument(skip(state, path))]
pub async fn get_totals(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Totals>, ApiError> {
    let Path(user_id) = path?;
    let totals = services::totals_for(state.store.as_ref(), user_id).await?;
    Ok(Json(totals))
}
