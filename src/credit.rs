// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credit-card reconciliation.
//!
//! Pure computation over a set of transactions. Outstanding debt is never
//! stored; it is re-derived from the expenses, refunds and repayments booked
//! against the card.

use crate::models::{Account, Transaction, TransactionKind};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Reminders fire this many days ahead of the due date.
pub const REMINDER_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditSummary {
    pub account_id: i64,
    pub limit: Decimal,
    pub outstanding: Decimal,
    /// Negative when the card is over its limit.
    pub available: Decimal,
    /// Overpayment parked on the card's balance field.
    pub overpayment_credit: Decimal,
    pub statement: StatementPeriod,
    /// Expenses minus refunds dated inside the current statement period.
    pub statement_spend: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueReminder {
    pub account_id: i64,
    pub outstanding: Decimal,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub is_overdue: bool,
}

/// `expenses - refunds - repayments` over transactions whose account is
/// `account_id`. Positive means debt, negative means overpayment.
fn net_owed(account_id: i64, txs: &[Transaction]) -> Decimal {
    let mut owed = Decimal::ZERO;
    for tx in txs.iter().filter(|t| t.account_id == account_id) {
        match tx.kind {
            TransactionKind::Expense => owed += tx.amount,
            TransactionKind::Refund { .. } | TransactionKind::Repayment { .. } => {
                owed -= tx.amount
            }
            TransactionKind::Income | TransactionKind::Transfer { .. } => {}
        }
    }
    owed
}

/// `max(0, expenses - refunds - repayments)` for one credit account.
pub fn outstanding_balance(account_id: i64, txs: &[Transaction]) -> Decimal {
    net_owed(account_id, txs).max(Decimal::ZERO)
}

/// `max(0, refunds + repayments - expenses)`: what was paid beyond the debt.
/// Never positive while [`outstanding_balance`] is.
pub fn overpayment_credit(account_id: i64, txs: &[Transaction]) -> Decimal {
    (-net_owed(account_id, txs)).max(Decimal::ZERO)
}

pub fn available_credit(limit: Decimal, outstanding: Decimal) -> Decimal {
    limit - outstanding
}

fn add_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn sub_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

// Days are 1..=28 so every month has them.
fn on_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, 28)).unwrap_or(NaiveDate::MIN)
}

/// Next occurrence of `due_day`: this month if not yet passed, else next.
pub fn next_due_date(today: NaiveDate, due_day: u32) -> NaiveDate {
    if today.day() <= due_day {
        on_day(today.year(), today.month(), due_day)
    } else {
        let (y, m) = add_month(today.year(), today.month());
        on_day(y, m, due_day)
    }
}

/// The billing cycle containing `today`, closing on `billing_day`.
pub fn statement_period(today: NaiveDate, billing_day: u32) -> StatementPeriod {
    let end = if today.day() <= billing_day {
        on_day(today.year(), today.month(), billing_day)
    } else {
        let (y, m) = add_month(today.year(), today.month());
        on_day(y, m, billing_day)
    };
    let (py, pm) = sub_month(end.year(), end.month());
    let start = on_day(py, pm, billing_day) + Duration::days(1);
    StatementPeriod { start, end }
}

pub fn due_reminder(
    account_id: i64,
    today: NaiveDate,
    due_day: u32,
    outstanding: Decimal,
) -> Option<DueReminder> {
    if outstanding <= Decimal::ZERO {
        return None;
    }
    let due_date = next_due_date(today, due_day);
    let days_until_due = (due_date - today).num_days();
    let is_overdue = today.day() > due_day;
    if days_until_due <= REMINDER_WINDOW_DAYS || is_overdue {
        Some(DueReminder {
            account_id,
            outstanding,
            due_date,
            days_until_due,
            is_overdue,
        })
    } else {
        None
    }
}

/// Summary for a credit account, `None` for any other kind.
pub fn summarize(account: &Account, txs: &[Transaction], today: NaiveDate) -> Option<CreditSummary> {
    let terms = account.kind.credit_terms()?;
    let outstanding = outstanding_balance(account.id, txs);
    let statement = statement_period(today, terms.billing_day);
    let statement_spend = txs
        .iter()
        .filter(|t| t.account_id == account.id)
        .filter(|t| t.date >= statement.start && t.date <= statement.end)
        .map(|t| match t.kind {
            TransactionKind::Expense => t.amount,
            TransactionKind::Refund { .. } => -t.amount,
            _ => Decimal::ZERO,
        })
        .sum::<Decimal>()
        .max(Decimal::ZERO);
    Some(CreditSummary {
        account_id: account.id,
        limit: terms.limit,
        outstanding,
        available: available_credit(terms.limit, outstanding),
        overpayment_credit: overpayment_credit(account.id, txs),
        statement,
        statement_spend,
    })
}
