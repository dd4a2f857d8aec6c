// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Ledger, apply_postings, begin, owned_transaction, postings, reconcile_credit};
use crate::error::LedgerResult;
use crate::models::{Attachment, Transaction, UserId};
use crate::store;
use rusqlite::Connection;
use serde::Serialize;

/// Everything a delete will remove, computed before any row changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletePlan {
    pub root: Transaction,
    /// Refunds against `root`; empty unless `root` is an expense.
    pub refunds: Vec<Transaction>,
    /// Attachments linked to `root` or to any of its refunds.
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub transaction_id: i64,
    pub refund_ids: Vec<i64>,
    pub attachment_ids: Vec<i64>,
}

pub fn plan_delete(conn: &Connection, root: Transaction) -> LedgerResult<DeletePlan> {
    let refunds = if root.is_expense() {
        store::refunds_of(conn, root.id)?
    } else {
        Vec::new()
    };
    let mut attachments = store::attachments_of(conn, root.id)?;
    for r in &refunds {
        attachments.extend(store::attachments_of(conn, r.id)?);
    }
    Ok(DeletePlan {
        root,
        refunds,
        attachments,
    })
}

/// Undo every balance effect in the plan and remove its rows.
fn execute(conn: &Connection, plan: &DeletePlan) -> LedgerResult<()> {
    for r in &plan.refunds {
        apply_postings(conn, &postings(r), true)?;
    }
    apply_postings(conn, &postings(&plan.root), true)?;

    let attachment_ids: Vec<i64> = plan.attachments.iter().map(|a| a.id).collect();
    store::delete_attachments(conn, &attachment_ids)?;
    let refund_ids: Vec<i64> = plan.refunds.iter().map(|r| r.id).collect();
    store::delete_transactions(conn, &refund_ids)?;
    store::delete_transactions(conn, &[plan.root.id])?;

    let touched = plan
        .refunds
        .iter()
        .chain(std::iter::once(&plan.root))
        .map(|t| t.account_id);
    reconcile_credit(conn, touched)?;
    Ok(())
}

impl Ledger<'_> {
    /// Delete a transaction together with its dependents.
    ///
    /// Deleting an expense also deletes its refunds and every attachment
    /// linked to any of them. Stored files are removed after the commit and
    /// failures there do not undo the delete.
    pub fn delete(&mut self, user: UserId, id: i64) -> LedgerResult<DeleteOutcome> {
        let tx = begin(self.conn)?;
        let root = owned_transaction(&tx, user, id)?;
        let plan = plan_delete(&tx, root)?;
        tracing::debug!(
            transaction_id = id,
            "delete plan: {} refunds, {} attachments",
            plan.refunds.len(),
            plan.attachments.len()
        );
        execute(&tx, &plan)?;
        tx.commit()?;

        self.remove_stored_files(&plan.attachments);
        let outcome = DeleteOutcome {
            transaction_id: id,
            refund_ids: plan.refunds.iter().map(|r| r.id).collect(),
            attachment_ids: plan.attachments.iter().map(|a| a.id).collect(),
        };
        tracing::info!(
            transaction_id = id,
            "deleted {} with {} refunds and {} attachments",
            plan.root.kind.as_str(),
            outcome.refund_ids.len(),
            outcome.attachment_ids.len()
        );
        Ok(outcome)
    }
}
