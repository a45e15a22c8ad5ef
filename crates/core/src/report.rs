//! Finance and resident aggregates.
//!
//! Everything here is a pure function over a full list. Results are
//! recomputed on every call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{FinanceTransaction, Resident};
use crate::types::{Month, TransactionType};

/// `part` as a percentage of `whole`, rounded to two decimals.
///
/// Returns 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub count: usize,
}

impl FinanceSummary {
    /// Sum incomes and expenses.
    #[must_use]
    pub fn of(transactions: &[FinanceTransaction]) -> Self {
        let mut summary = Self::default();
        for tx in transactions {
            match tx.kind {
                TransactionType::Income => summary.total_income += tx.amount,
                TransactionType::Expense => summary.total_expense += tx.amount,
            }
            summary.count += 1;
        }
        summary.balance = summary.total_income - summary.total_expense;
        summary
    }
}

/// Total of one category within one transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Share of the total for `kind`.
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

/// Per-category totals, incomes before expenses, largest first within a type.
#[must_use]
pub fn by_category(transactions: &[FinanceTransaction]) -> Vec<CategoryTotal> {
    let summary = FinanceSummary::of(transactions);
    let mut totals: BTreeMap<(u8, &str), Decimal> = BTreeMap::new();
    for tx in transactions {
        *totals
            .entry((type_rank(tx.kind), tx.category.as_str()))
            .or_default() += tx.amount;
    }

    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|((rank, category), total)| {
            let kind = if rank == 0 {
                TransactionType::Income
            } else {
                TransactionType::Expense
            };
            let whole = match kind {
                TransactionType::Income => summary.total_income,
                TransactionType::Expense => summary.total_expense,
            };
            CategoryTotal {
                kind,
                category: category.to_owned(),
                total,
                percentage: percentage(total, whole),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        type_rank(a.kind)
            .cmp(&type_rank(b.kind))
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

const fn type_rank(kind: TransactionType) -> u8 {
    match kind {
        TransactionType::Income => 0,
        TransactionType::Expense => 1,
    }
}

/// Income and expense within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month: Month,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Per-month totals in ascending month order. Months without transactions
/// are omitted.
#[must_use]
pub fn by_month(transactions: &[FinanceTransaction]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<Month, (Decimal, Decimal)> = BTreeMap::new();
    for tx in transactions {
        let entry = months.entry(Month::of(tx.date)).or_default();
        match tx.kind {
            TransactionType::Income => entry.0 += tx.amount,
            TransactionType::Expense => entry.1 += tx.amount,
        }
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month,
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}

/// Body of `GET /api/keuangan/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub summary: FinanceSummary,
    pub by_category: Vec<CategoryTotal>,
    pub by_month: Vec<MonthlyTotal>,
}

impl FinanceReport {
    #[must_use]
    pub fn of(transactions: &[FinanceTransaction]) -> Self {
        Self {
            summary: FinanceSummary::of(transactions),
            by_category: by_category(transactions),
            by_month: by_month(transactions),
        }
    }
}

/// A labelled count with its share of the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountShare {
    pub label: String,
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

/// Public resident statistics. Contains no personal data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentStats {
    pub total: usize,
    pub by_sex: Vec<CountShare>,
    pub by_rt: Vec<CountShare>,
    pub by_category: Vec<CountShare>,
}

/// Label used for residents with no value for a grouping field.
pub const UNSPECIFIED: &str = "unspecified";

impl ResidentStats {
    #[must_use]
    pub fn of(residents: &[Resident]) -> Self {
        let total = residents.len();
        Self {
            total,
            by_sex: shares(
                residents
                    .iter()
                    .map(|r| r.sex.map_or(UNSPECIFIED, |s| s.as_str())),
                total,
            ),
            by_rt: shares(residents.iter().map(|r| r.rt.as_str()), total),
            by_category: shares(
                residents
                    .iter()
                    .map(|r| r.category.as_deref().unwrap_or(UNSPECIFIED)),
                total,
            ),
        }
    }
}

/// Count labels, keeping them in ascending label order.
fn shares<'a>(labels: impl Iterator<Item = &'a str>, total: usize) -> Vec<CountShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let whole = Decimal::from(total);
    counts
        .into_iter()
        .map(|(label, count)| CountShare {
            label: label.to_owned(),
            count,
            percentage: percentage(Decimal::from(count), whole),
        })
        .collect()
}

/// Body of `GET /api/residents/last-update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdate {
    pub last_updated: Option<DateTime<Utc>>,
}
