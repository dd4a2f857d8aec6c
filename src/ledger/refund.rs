// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{
    DeleteOutcome, Ledger, apply_postings, begin, check_account_for, owned_account,
    owned_transaction, postings, reconcile_credit,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewRefund, Transaction, TransactionKind, UserId};
use crate::store;
use rust_decimal::Decimal;

/// Slack allowed when comparing a refund against the refundable amount.
pub const REFUND_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

impl Ledger<'_> {
    /// What can still be refunded against the expense `original_id`.
    pub fn refundable_amount(&self, user: UserId, original_id: i64) -> LedgerResult<Decimal> {
        let original = owned_transaction(self.conn, user, original_id)?;
        if !original.is_expense() {
            return Err(LedgerError::RefundInvalidType(original.id));
        }
        let refunded = store::refunded_total(self.conn, original.id)?;
        Ok((original.amount - refunded).max(Decimal::ZERO))
    }

    /// Refund part or all of an expense.
    ///
    /// The refund inherits the expense's account and category. On a credit
    /// account it lowers the derived outstanding balance instead of touching
    /// the balance field.
    pub fn create_refund(&mut self, user: UserId, new: NewRefund) -> LedgerResult<Transaction> {
        let tx = begin(self.conn)?;
        let original = owned_transaction(&tx, user, new.original_id)?;
        if !original.is_expense() {
            return Err(LedgerError::RefundInvalidType(original.id));
        }
        let amount = new.amount.round_dp(2);
        if amount <= Decimal::ZERO {
            return Err(LedgerError::RefundAmountInvalid);
        }
        let refundable = original.amount - store::refunded_total(&tx, original.id)?;
        if refundable <= Decimal::ZERO {
            return Err(LedgerError::RefundAlreadyFull);
        }
        // Refundable amounts are whole cents, so anything within the
        // tolerance rounds to at most `refundable`.
        if new.amount - refundable > REFUND_TOLERANCE {
            return Err(LedgerError::RefundAmountExceeded {
                requested: new.amount,
                refundable,
            });
        }

        let kind = TransactionKind::Refund {
            original_id: original.id,
        };
        let account = owned_account(&tx, user, original.account_id)?;
        check_account_for(&kind, &account)?;

        let id = store::insert_transaction(
            &tx,
            user,
            &kind,
            amount,
            original.account_id,
            original.category_id,
            new.date,
            new.note.as_deref(),
        )?;
        let refund = Transaction {
            id,
            owner_id: user,
            kind,
            amount,
            account_id: original.account_id,
            category_id: original.category_id,
            date: new.date,
            note: new.note,
        };
        apply_postings(&tx, &postings(&refund), false)?;
        reconcile_credit(&tx, [refund.account_id])?;
        tx.commit()?;
        tracing::info!(
            transaction_id = id,
            original_id = original.id,
            "refunded {} of {} ({} left)",
            amount,
            original.amount,
            refundable - amount
        );
        Ok(refund)
    }

    /// Delete a refund, restoring the account and the refundable amount.
    /// The original expense and its other refunds are left as they are.
    pub fn delete_refund(&mut self, user: UserId, refund_id: i64) -> LedgerResult<DeleteOutcome> {
        let refund = owned_transaction(self.conn, user, refund_id)?;
        if refund.original_id().is_none() {
            return Err(LedgerError::RefundInvalidType(refund.id));
        }
        self.delete(user, refund_id)
    }
}
