use std::collections::BTreeMap;

use serde::Serialize;

use super::repo_types::{Category, Expense};

/// Spending summary for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_expense: f64,
    pub total_salary: f64,
    pub remaining_amount: f64,
    pub category_breakdown: BTreeMap<Category, f64>,
}

impl Totals {
    /// `sums` holds per-category amounts; repeated categories are merged and
    /// categories without spending never appear in the breakdown.
    pub fn compute(salary: f64, sums: impl IntoIterator<Item = (Category, f64)>) -> Self {
        let mut category_breakdown = BTreeMap::new();
        for (category, amount) in sums {
            *category_breakdown.entry(category).or_insert(0.0) += amount;
        }
        // `Sum` for f64 starts at -0.0; an empty breakdown must report 0.0.
        let total_expense = category_breakdown.values().fold(0.0, |acc, v| acc + v);

        Self {
            total_expense,
            total_salary: salary,
            remaining_amount: salary - total_expense,
            category_breakdown,
        }
    }
}

/// Group-by-category sum over a set of expenses.
pub fn category_sums<'e>(expenses: impl IntoIterator<Item = &'e Expense>) -> Vec<(Category, f64)> {
    let mut sums: BTreeMap<Category, f64> = BTreeMap::new();
    for e in expenses {
        *sums.entry(e.category).or_insert(0.0) += e.amount;
    }
    sums.into_iter().collect()
}
