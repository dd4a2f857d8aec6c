// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only period statistics over the ledger.

use crate::models::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNet {
    pub category_id: Option<i64>,
    pub expense: Decimal,
    pub refund: Decimal,
    /// Floored at zero: a category never shows negative spend.
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_refund: Decimal,
    /// Not floored; negative when refunds exceed expenses in the period.
    pub net_expense: Decimal,
    pub balance: Decimal,
    pub categories: Vec<CategoryNet>,
}

/// Transfers and repayments move money between the user's own accounts and
/// are left out.
pub fn summarize(txs: &[Transaction]) -> PeriodSummary {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut total_refund = Decimal::ZERO;
    let mut by_cat: BTreeMap<Option<i64>, (Decimal, Decimal)> = BTreeMap::new();

    for tx in txs {
        match tx.kind {
            TransactionKind::Income => total_income += tx.amount,
            TransactionKind::Expense => {
                total_expense += tx.amount;
                by_cat
                    .entry(tx.category_id)
                    .or_insert((Decimal::ZERO, Decimal::ZERO))
                    .0 += tx.amount;
            }
            TransactionKind::Refund { .. } => {
                total_refund += tx.amount;
                by_cat
                    .entry(tx.category_id)
                    .or_insert((Decimal::ZERO, Decimal::ZERO))
                    .1 += tx.amount;
            }
            TransactionKind::Repayment { .. } | TransactionKind::Transfer { .. } => {}
        }
    }

    let net_expense = total_expense - total_refund;
    let categories = by_cat
        .into_iter()
        .map(|(category_id, (expense, refund))| CategoryNet {
            category_id,
            expense,
            refund,
            net: (expense - refund).max(Decimal::ZERO),
        })
        .collect();

    PeriodSummary {
        total_income,
        total_expense,
        total_refund,
        net_expense,
        balance: total_income - net_expense,
        categories,
    }
}
