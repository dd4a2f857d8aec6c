// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Billing terms carried only by credit accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTerms {
    pub limit: Decimal,
    pub billing_day: u32, // 1..=28
    pub due_day: u32,     // 1..=28
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountKind {
    Cash,
    Bank,
    Alipay,
    Wechat,
    Credit(CreditTerms),
    Investment,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "cash",
            AccountKind::Bank => "bank",
            AccountKind::Alipay => "alipay",
            AccountKind::Wechat => "wechat",
            AccountKind::Credit(_) => "credit",
            AccountKind::Investment => "investment",
            AccountKind::Other => "other",
        }
    }

    /// Parse a non-credit account type. Credit accounts need terms and are
    /// built with [`AccountKind::Credit`] directly.
    pub fn parse_plain(s: &str) -> Option<AccountKind> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(AccountKind::Cash),
            "bank" => Some(AccountKind::Bank),
            "alipay" => Some(AccountKind::Alipay),
            "wechat" => Some(AccountKind::Wechat),
            "investment" => Some(AccountKind::Investment),
            "other" => Some(AccountKind::Other),
            _ => None,
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, AccountKind::Credit(_))
    }

    pub fn is_investment(&self) -> bool {
        matches!(self, AccountKind::Investment)
    }

    pub fn credit_terms(&self) -> Option<&CreditTerms> {
        match self {
            AccountKind::Credit(terms) => Some(terms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner_id: UserId,
    pub name: String,
    pub kind: AccountKind,
    /// Real cash for non-credit accounts. For credit accounts this is the
    /// overpayment credit, re-derived from the account's transactions after
    /// every change; outstanding debt is derived, never stored.
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub owner_id: UserId,
    pub name: String,
}

/// What a transaction is, with exactly the fields its type needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Refund {
        original_id: i64,
    },
    Repayment {
        source_account_id: i64,
    },
    Transfer {
        to_account_id: i64,
    },
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Refund { .. } => "refund",
            TransactionKind::Repayment { .. } => "repayment",
            TransactionKind::Transfer { .. } => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: UserId,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// For repayments this is the credit account being paid down; for
    /// transfers it is the sending account.
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense)
    }

    pub fn original_id(&self) -> Option<i64> {
        match self.kind {
            TransactionKind::Refund { original_id } => Some(original_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub owner_id: UserId,
    pub transaction_id: Option<i64>,
    pub storage_path: String,
}

/// Plain money movements accepted by [`crate::ledger::Ledger::create`].
/// Refunds and repayments have their own entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Income,
    Expense,
    Transfer { to_account_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: EntryKind,
    pub amount: Decimal,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRefund {
    pub original_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRepayment {
    pub credit_account_id: i64,
    pub source_account_id: i64,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Field edits for an existing transaction. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    pub account_id: Option<i64>,
    pub category_id: Option<Option<i64>>,
    pub date: Option<NaiveDate>,
    pub note: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub month: Option<String>, // YYYY-MM
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub limit: Option<usize>,
}
