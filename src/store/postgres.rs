use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::expenses::{
    filters::{day_bounds, ExpenseFilter},
    repo_types::{Category, Expense, ExpenseRow, NewExpense},
};
use crate::users::repo_types::{NewUser, User};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        salary        DOUBLE PRECISION NOT NULL DEFAULT 0,
        password_hash TEXT,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS expenses (
        id         UUID PRIMARY KEY,
        user_id    UUID NOT NULL REFERENCES users (id),
        name       TEXT NOT NULL,
        amount     DOUBLE PRECISION NOT NULL CHECK (amount > 0),
        category   TEXT NOT NULL
                   CHECK (category IN ('Food', 'Transport', 'Entertainment', 'Utilities', 'Other')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS expenses_user_created_idx
        ON expenses (user_id, created_at)
    "#,
];

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Creates the tables if they are missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&self.db)
                .await
                .context("create schema")?;
        }
        Ok(())
    }
}

fn violates(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(code))
}

/// Appends the filter's conditions to a query already holding a `WHERE` clause.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ExpenseFilter) {
    if let Some(day) = filter.day {
        let (start, end) = day_bounds(day);
        qb.push(" AND created_at >= ").push_bind(start);
        qb.push(" AND created_at < ").push_bind(end);
    }
    if let Some(w) = filter.week {
        qb.push(" AND EXTRACT(WEEK FROM created_at AT TIME ZONE 'UTC')::BIGINT = ")
            .push_bind(i64::from(w.week));
        qb.push(" AND EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::BIGINT = ")
            .push_bind(i64::from(w.year));
    }
    if let Some(m) = filter.month {
        qb.push(" AND EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::BIGINT = ")
            .push_bind(i64::from(m.month));
        qb.push(" AND EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::BIGINT = ")
            .push_bind(i64::from(m.year));
    }
    if let Some(c) = filter.category {
        qb.push(" AND category = ").push_bind(c.as_str());
    }
}

fn list_query(user_id: Uuid, filter: &ExpenseFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, user_id, name, amount, category, created_at FROM expenses WHERE user_id = ",
    );
    qb.push_bind(user_id);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at ASC, id ASC");
    qb
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, salary, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, salary, password_hash
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(new.salary)
        .bind(&new.password_hash)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(e) if violates(&e, UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateUsername(new.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, salary, password_hash FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, salary, password_hash FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_expense(&self, new: NewExpense) -> Result<Expense, StoreError> {
        let res = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (id, user_id, name, amount, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, amount, category, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.name)
        .bind(new.amount)
        .bind(new.category.as_str())
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => row.try_into(),
            Err(e) if violates(&e, FOREIGN_KEY_VIOLATION) => {
                Err(StoreError::MissingUser(new.user_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, StoreError> {
        let mut qb = list_query(user_id, filter);
        debug!(sql = qb.sql(), "list expenses");
        let rows = qb
            .build_query_as::<ExpenseRow>()
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(Expense::try_from).collect()
    }

    async fn category_sums(&self, user_id: Uuid) -> Result<Vec<(Category, f64)>, StoreError> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT category, SUM(amount)
            FROM expenses
            WHERE user_id = $1
            GROUP BY category
            ORDER BY category
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(category, sum)| {
                let category = category.parse::<Category>().map_err(StoreError::Corrupt)?;
                Ok::<_, StoreError>((category, sum))
            })
            .collect()
    }
}
