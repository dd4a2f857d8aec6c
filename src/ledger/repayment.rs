// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{
    DeleteOutcome, Ledger, apply_postings, begin, normalize_amount, owned_account, owned_category,
    owned_transaction, postings, reconcile_credit,
};
use crate::credit;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewRepayment, Transaction, TransactionKind, UserId};
use crate::store;
use rust_decimal::Decimal;

impl Ledger<'_> {
    /// Pay down a credit account from a non-credit account.
    ///
    /// The source loses exactly `amount`. Whatever exceeds the current
    /// outstanding balance shows up as overpayment credit in the card's
    /// balance field, which is re-derived from the card's transactions.
    pub fn create_repayment(
        &mut self,
        user: UserId,
        new: NewRepayment,
    ) -> LedgerResult<Transaction> {
        let amount = normalize_amount(new.amount).ok_or(LedgerError::InvalidAmount)?;
        let tx = begin(self.conn)?;

        let card = owned_account(&tx, user, new.credit_account_id)?;
        if !card.kind.is_credit() {
            return Err(LedgerError::InvalidCreditAccount(card.id));
        }
        let source = owned_account(&tx, user, new.source_account_id)?;
        if source.kind.is_credit() {
            return Err(LedgerError::InvalidSourceAccount(source.id));
        }
        if source.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: source.balance,
            });
        }
        if let Some(cat) = new.category_id {
            owned_category(&tx, user, cat)?;
        }

        let outstanding =
            credit::outstanding_balance(card.id, &store::transactions_on_account(&tx, card.id)?);
        let kind = TransactionKind::Repayment {
            source_account_id: source.id,
        };

        let id = store::insert_transaction(
            &tx,
            user,
            &kind,
            amount,
            card.id,
            new.category_id,
            new.date,
            new.note.as_deref(),
        )?;
        let repayment = Transaction {
            id,
            owner_id: user,
            kind,
            amount,
            account_id: card.id,
            category_id: new.category_id,
            date: new.date,
            note: new.note,
        };
        apply_postings(&tx, &postings(&repayment), false)?;
        reconcile_credit(&tx, [card.id])?;
        tx.commit()?;
        tracing::info!(
            transaction_id = id,
            account_id = card.id,
            source_account_id = source.id,
            "repaid {} against {} outstanding (overpayment {})",
            amount,
            outstanding,
            (amount - outstanding).max(Decimal::ZERO)
        );
        Ok(repayment)
    }

    /// Exact inverse of [`Ledger::create_repayment`]: the source gets the
    /// amount back and the card's debt and credit are re-derived without it.
    pub fn delete_repayment(
        &mut self,
        user: UserId,
        repayment_id: i64,
    ) -> LedgerResult<DeleteOutcome> {
        let repayment = owned_transaction(self.conn, user, repayment_id)?;
        if !matches!(repayment.kind, TransactionKind::Repayment { .. }) {
            return Err(LedgerError::RefundInvalidType(repayment.id));
        }
        self.delete(user, repayment_id)
    }
}
