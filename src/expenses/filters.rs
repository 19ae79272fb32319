//! Translation of the optional `/expenses/{user_id}` query parameters into a
//! predicate over a user's expenses.
//!
//! Every present filter is ANDed. `week` and `month` only apply when `year` is
//! also supplied; a lone half of either pair is ignored rather than rejected.
//! Timestamps are compared in UTC.

use serde::Deserialize;
use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

use super::repo_types::{Category, Expense};
use crate::error::ApiError;

/// Query parameters as they arrive on the wire.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExpenseQuery {
    pub day: Option<String>,
    pub week: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub category: Option<Category>,
}

/// ISO week number within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekOfYear {
    pub week: i32,
    pub year: i32,
}

/// Month number within a calendar year. Out-of-range numbers match nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthOfYear {
    pub month: i32,
    pub year: i32,
}

/// Validated filter set. `Default` matches everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub day: Option<Date>,
    pub week: Option<WeekOfYear>,
    pub month: Option<MonthOfYear>,
    pub category: Option<Category>,
}

/// Parses a `YYYY-MM-DD` day filter.
pub fn parse_day(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ApiError::MalformedFilter(format!("Invalid day `{raw}`, expected YYYY-MM-DD"))
    })
}

impl ExpenseFilter {
    /// Empty strings and zero numbers count as "not supplied".
    pub fn from_query(q: &ExpenseQuery) -> Result<Self, ApiError> {
        let day = match q.day.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_day(raw)?),
            _ => None,
        };

        let week = q.week.filter(|w| *w != 0);
        let month = q.month.filter(|m| *m != 0);
        let year = q.year.filter(|y| *y != 0);

        Ok(Self {
            day,
            week: week.zip(year).map(|(week, year)| WeekOfYear { week, year }),
            month: month.zip(year).map(|(month, year)| MonthOfYear { month, year }),
            category: q.category,
        })
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        let at = expense.created_at.to_offset(UtcOffset::UTC);

        self.day.map_or(true, |d| at.date() == d)
            && self.week.map_or(true, |w| {
                i32::from(at.iso_week()) == w.week && at.year() == w.year
            })
            && self.month.map_or(true, |m| {
                i32::from(u8::from(at.month())) == m.month && at.year() == m.year
            })
            && self.category.map_or(true, |c| expense.category == c)
    }

    pub fn apply<'e>(&self, expenses: impl IntoIterator<Item = &'e Expense>) -> Vec<Expense> {
        expenses
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

/// Day boundaries `[start, end)` in UTC, used by SQL translations.
pub fn day_bounds(day: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = day.midnight().assume_utc();
    (start, start + time::Duration::DAY)
}
