// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction ledger.
//!
//! [`Ledger`] is the only way balances change. Each public operation opens
//! one immediate SQLite transaction, validates everything up front, applies
//! the balance effects and commits. A rejected or failed operation leaves
//! the database untouched.
//!
//! Balance effects are expressed as [`Posting`]s, which only ever reach
//! non-credit accounts. A credit account's debt is derived (see
//! [`crate::credit`]); its `balance` field holds the overpayment credit and
//! is re-derived by [`reconcile_credit`] inside the same store transaction
//! whenever a row on it changes.

mod attachments;
mod cascade;
mod refund;
mod repayment;

pub use cascade::{DeleteOutcome, DeletePlan, plan_delete};

use crate::credit::{self, CreditSummary, DueReminder};
use crate::error::{LedgerError, LedgerResult};
use crate::files::FileStore;
use crate::models::{
    Account, AccountKind, Attachment, Category, EntryKind, NewTransaction, Transaction,
    TransactionChanges, TransactionFilter, TransactionKind, UserId,
};
use crate::stats::{self, PeriodSummary};
use crate::store;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;

pub struct Ledger<'a> {
    conn: &'a mut Connection,
    files: &'a dyn FileStore,
}

/// Result of moving a transaction to another account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountChange {
    pub transaction: Transaction,
    pub old_account_delta: Decimal,
    pub new_account_delta: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Posting {
    account_id: i64,
    delta: Decimal,
}

impl Posting {
    fn cash(account_id: i64, delta: Decimal) -> Self {
        Posting { account_id, delta }
    }
}

/// Balance effects of a transaction. The first posting always targets
/// `tx.account_id`.
pub(crate) fn postings(tx: &Transaction) -> Vec<Posting> {
    let a = tx.amount;
    match tx.kind {
        TransactionKind::Income => vec![Posting::cash(tx.account_id, a)],
        TransactionKind::Expense => vec![Posting::cash(tx.account_id, -a)],
        TransactionKind::Refund { .. } => vec![Posting::cash(tx.account_id, a)],
        TransactionKind::Transfer { to_account_id } => vec![
            Posting::cash(tx.account_id, -a),
            Posting::cash(to_account_id, a),
        ],
        TransactionKind::Repayment { source_account_id } => vec![
            Posting::cash(tx.account_id, a),
            Posting::cash(source_account_id, -a),
        ],
    }
}

/// Apply (or undo) postings. Returns the delta actually written per
/// posting, zero where the account is a credit account.
pub(crate) fn apply_postings(
    conn: &Connection,
    postings: &[Posting],
    reverse: bool,
) -> LedgerResult<Vec<Decimal>> {
    let mut applied = Vec::with_capacity(postings.len());
    for p in postings {
        let account = store::find_account(conn, p.account_id)?.ok_or(LedgerError::NotFound {
            entity: "account",
            id: p.account_id,
        })?;
        if account.kind.is_credit() {
            applied.push(Decimal::ZERO);
            continue;
        }
        let delta = if reverse { -p.delta } else { p.delta };
        if !delta.is_zero() {
            store::adjust_balance(conn, p.account_id, delta)?;
        }
        applied.push(delta);
    }
    Ok(applied)
}

/// Re-derive the overpayment credit held in the `balance` field of every
/// credit account among `account_ids`. Call after the rows are written.
pub(crate) fn reconcile_credit(
    conn: &Connection,
    account_ids: impl IntoIterator<Item = i64>,
) -> LedgerResult<()> {
    let mut seen = Vec::new();
    for id in account_ids {
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);
        let Some(account) = store::find_account(conn, id)? else {
            continue;
        };
        if !account.kind.is_credit() {
            continue;
        }
        let txs = store::transactions_on_account(conn, id)?;
        let held = credit::overpayment_credit(id, &txs);
        if held != account.balance {
            store::set_balance(conn, id, held)?;
            tracing::debug!(account_id = id, "overpayment credit now {}", held);
        }
    }
    Ok(())
}

pub(crate) fn begin(conn: &mut Connection) -> LedgerResult<rusqlite::Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Round to cents and reject anything that is not strictly positive.
pub(crate) fn normalize_amount(amount: Decimal) -> Option<Decimal> {
    let a = amount.round_dp(2);
    (a > Decimal::ZERO).then_some(a)
}

fn check_owner<T>(
    found: Option<T>,
    owner_of: impl Fn(&T) -> UserId,
    user: UserId,
    entity: &'static str,
    id: i64,
) -> LedgerResult<T> {
    match found {
        None => Err(LedgerError::NotFound { entity, id }),
        Some(v) if owner_of(&v) != user => Err(LedgerError::Forbidden { entity, id }),
        Some(v) => Ok(v),
    }
}

pub(crate) fn owned_account(conn: &Connection, user: UserId, id: i64) -> LedgerResult<Account> {
    check_owner(store::find_account(conn, id)?, |a| a.owner_id, user, "account", id)
}

pub(crate) fn owned_transaction(
    conn: &Connection,
    user: UserId,
    id: i64,
) -> LedgerResult<Transaction> {
    check_owner(
        store::find_transaction(conn, id)?,
        |t| t.owner_id,
        user,
        "transaction",
        id,
    )
}

pub(crate) fn owned_category(conn: &Connection, user: UserId, id: i64) -> LedgerResult<Category> {
    check_owner(store::find_category(conn, id)?, |c| c.owner_id, user, "category", id)
}

pub(crate) fn owned_attachment(
    conn: &Connection,
    user: UserId,
    id: i64,
) -> LedgerResult<Attachment> {
    check_owner(
        store::find_attachment(conn, id)?,
        |a| a.owner_id,
        user,
        "attachment",
        id,
    )
}

/// Account-type isolation: which account kinds each transaction type may
/// be booked against.
pub(crate) fn check_account_for(kind: &TransactionKind, account: &Account) -> LedgerResult<()> {
    let ok = match kind {
        TransactionKind::Income => !account.kind.is_investment() && !account.kind.is_credit(),
        TransactionKind::Expense | TransactionKind::Refund { .. } => {
            !account.kind.is_investment()
        }
        TransactionKind::Transfer { .. } => !account.kind.is_credit(),
        TransactionKind::Repayment { .. } => {
            return if account.kind.is_credit() {
                Ok(())
            } else {
                Err(LedgerError::InvalidCreditAccount(account.id))
            };
        }
    };
    if ok {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccountType(account.id))
    }
}

fn validate_terms(kind: &AccountKind) -> LedgerResult<()> {
    if let Some(t) = kind.credit_terms() {
        if t.limit < Decimal::ZERO {
            return Err(LedgerError::InvalidCreditTerms(format!(
                "credit limit {} is negative",
                t.limit
            )));
        }
        for (label, day) in [("billing day", t.billing_day), ("due day", t.due_day)] {
            if !(1..=28).contains(&day) {
                return Err(LedgerError::InvalidCreditTerms(format!(
                    "{} {} is outside 1..=28",
                    label, day
                )));
            }
        }
    }
    Ok(())
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a mut Connection, files: &'a dyn FileStore) -> Self {
        Self { conn, files }
    }

    pub fn connection(&self) -> &Connection {
        self.conn
    }

    // ---------- account store ----------

    pub fn create_account(
        &mut self,
        user: UserId,
        name: &str,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> LedgerResult<Account> {
        validate_terms(&kind)?;
        if kind.is_credit() && !opening_balance.is_zero() {
            return Err(LedgerError::InvalidCreditTerms(
                "credit accounts start at zero; their balance is derived".to_string(),
            ));
        }
        let tx = begin(self.conn)?;
        let balance = opening_balance.round_dp(2);
        let id = store::insert_account(&tx, user, name.trim(), &kind, balance)?;
        tx.commit()?;
        tracing::info!(account_id = id, user, "created {} account '{}'", kind.as_str(), name);
        Ok(Account {
            id,
            owner_id: user,
            name: name.trim().to_string(),
            kind,
            balance,
        })
    }

    pub fn get_account(&self, user: UserId, id: i64) -> LedgerResult<Account> {
        owned_account(self.conn, user, id)
    }

    pub fn list_accounts(&self, user: UserId) -> LedgerResult<Vec<Account>> {
        Ok(store::list_accounts(self.conn, user)?)
    }

    pub fn create_category(&mut self, user: UserId, name: &str) -> LedgerResult<Category> {
        let id = store::insert_category(self.conn, user, name.trim())?;
        Ok(Category {
            id,
            owner_id: user,
            name: name.trim().to_string(),
        })
    }

    pub fn list_categories(&self, user: UserId) -> LedgerResult<Vec<Category>> {
        Ok(store::list_categories(self.conn, user)?)
    }

    // ---------- transactions ----------

    pub fn create(&mut self, user: UserId, new: NewTransaction) -> LedgerResult<Transaction> {
        let amount = normalize_amount(new.amount).ok_or(LedgerError::InvalidAmount)?;
        let tx = begin(self.conn)?;

        let account = owned_account(&tx, user, new.account_id)?;
        if let Some(cat) = new.category_id {
            owned_category(&tx, user, cat)?;
        }
        let kind = match new.kind {
            EntryKind::Income => TransactionKind::Income,
            EntryKind::Expense => TransactionKind::Expense,
            EntryKind::Transfer { to_account_id } => {
                let to = owned_account(&tx, user, to_account_id)?;
                if to.id == account.id || to.kind.is_credit() {
                    return Err(LedgerError::InvalidAccountType(to.id));
                }
                TransactionKind::Transfer { to_account_id }
            }
        };
        check_account_for(&kind, &account)?;

        let id = store::insert_transaction(
            &tx,
            user,
            &kind,
            amount,
            account.id,
            new.category_id,
            new.date,
            new.note.as_deref(),
        )?;
        let created = Transaction {
            id,
            owner_id: user,
            kind,
            amount,
            account_id: account.id,
            category_id: new.category_id,
            date: new.date,
            note: new.note,
        };
        apply_postings(&tx, &postings(&created), false)?;
        reconcile_credit(&tx, [account.id])?;
        tx.commit()?;
        tracing::info!(
            transaction_id = id,
            account_id = account.id,
            "recorded {} of {}",
            kind.as_str(),
            amount
        );
        Ok(created)
    }

    pub fn create_income(
        &mut self,
        user: UserId,
        account_id: i64,
        amount: Decimal,
        category_id: Option<i64>,
        date: NaiveDate,
    ) -> LedgerResult<Transaction> {
        self.create(
            user,
            NewTransaction {
                kind: EntryKind::Income,
                amount,
                account_id,
                category_id,
                date,
                note: None,
            },
        )
    }

    pub fn create_expense(
        &mut self,
        user: UserId,
        account_id: i64,
        amount: Decimal,
        category_id: Option<i64>,
        date: NaiveDate,
    ) -> LedgerResult<Transaction> {
        self.create(
            user,
            NewTransaction {
                kind: EntryKind::Expense,
                amount,
                account_id,
                category_id,
                date,
                note: None,
            },
        )
    }

    pub fn create_transfer(
        &mut self,
        user: UserId,
        from_account_id: i64,
        to_account_id: i64,
        amount: Decimal,
        date: NaiveDate,
    ) -> LedgerResult<Transaction> {
        self.create(
            user,
            NewTransaction {
                kind: EntryKind::Transfer { to_account_id },
                amount,
                account_id: from_account_id,
                category_id: None,
                date,
                note: None,
            },
        )
    }

    pub fn get_transaction(&self, user: UserId, id: i64) -> LedgerResult<Transaction> {
        owned_transaction(self.conn, user, id)
    }

    pub fn list_transactions(
        &self,
        user: UserId,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        Ok(store::list_transactions(self.conn, user, filter)?)
    }

    /// Edit a transaction. An account change is applied exactly as
    /// [`Ledger::change_account`] would, inside the same store transaction.
    pub fn update(
        &mut self,
        user: UserId,
        id: i64,
        changes: TransactionChanges,
    ) -> LedgerResult<Transaction> {
        let new_amount = match changes.amount {
            Some(a) => Some(normalize_amount(a).ok_or(LedgerError::InvalidAmount)?),
            None => None,
        };
        let tx = begin(self.conn)?;
        let mut current = owned_transaction(&tx, user, id)?;
        let old_account = current.account_id;

        if let Some(Some(cat)) = changes.category_id {
            owned_category(&tx, user, cat)?;
        }
        if let Some(amount) = new_amount.filter(|a| *a != current.amount) {
            match current.kind {
                TransactionKind::Income | TransactionKind::Transfer { .. } => {}
                TransactionKind::Expense => {
                    let refunded = store::refunded_total(&tx, current.id)?;
                    if amount < refunded {
                        return Err(LedgerError::RefundAmountExceeded {
                            requested: refunded,
                            refundable: amount,
                        });
                    }
                }
                TransactionKind::Refund { .. } | TransactionKind::Repayment { .. } => {
                    return Err(LedgerError::RefundInvalidType(current.id));
                }
            }
            apply_postings(&tx, &postings(&current), true)?;
            current.amount = amount;
            apply_postings(&tx, &postings(&current), false)?;
        }
        if let Some(new_account) = changes.account_id {
            current = move_to_account(&tx, user, current, new_account)?.transaction;
        }
        if let Some(cat) = changes.category_id {
            current.category_id = cat;
        }
        if let Some(date) = changes.date {
            current.date = date;
        }
        if let Some(note) = changes.note {
            current.note = note;
        }
        store::update_transaction(&tx, &current)?;
        reconcile_credit(&tx, [old_account, current.account_id])?;
        tx.commit()?;
        tracing::info!(transaction_id = id, "updated {}", current.kind.as_str());
        Ok(current)
    }

    /// Move a transaction to another account. For two non-credit accounts
    /// the two deltas always cancel out.
    pub fn change_account(
        &mut self,
        user: UserId,
        id: i64,
        new_account_id: i64,
    ) -> LedgerResult<AccountChange> {
        let tx = begin(self.conn)?;
        let current = owned_transaction(&tx, user, id)?;
        let old_account = current.account_id;
        let change = move_to_account(&tx, user, current, new_account_id)?;
        store::update_transaction(&tx, &change.transaction)?;
        reconcile_credit(&tx, [old_account, new_account_id])?;
        tx.commit()?;
        tracing::info!(
            transaction_id = id,
            account_id = new_account_id,
            "moved transaction ({} / {})",
            change.old_account_delta,
            change.new_account_delta
        );
        Ok(change)
    }

    // ---------- credit reconciliation ----------

    pub fn credit_summary(
        &self,
        user: UserId,
        account_id: i64,
        today: NaiveDate,
    ) -> LedgerResult<CreditSummary> {
        let account = owned_account(self.conn, user, account_id)?;
        let txs = store::transactions_on_account(self.conn, account.id)?;
        credit::summarize(&account, &txs, today)
            .ok_or(LedgerError::InvalidCreditAccount(account.id))
    }

    pub fn outstanding_balance(&self, user: UserId, account_id: i64) -> LedgerResult<Decimal> {
        let account = owned_account(self.conn, user, account_id)?;
        if !account.kind.is_credit() {
            return Err(LedgerError::InvalidCreditAccount(account.id));
        }
        let txs = store::transactions_on_account(self.conn, account.id)?;
        Ok(credit::outstanding_balance(account.id, &txs))
    }

    /// Reminders for every credit account of `user` that owes money and is
    /// due soon or overdue.
    pub fn due_reminders(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<DueReminder>> {
        let mut out = Vec::new();
        for account in store::list_accounts(self.conn, user)? {
            let Some(terms) = account.kind.credit_terms() else {
                continue;
            };
            let txs = store::transactions_on_account(self.conn, account.id)?;
            let outstanding = credit::outstanding_balance(account.id, &txs);
            if let Some(r) = credit::due_reminder(account.id, today, terms.due_day, outstanding) {
                out.push(r);
            }
        }
        Ok(out)
    }

    // ---------- statistics ----------

    /// Income/expense/refund totals for one `YYYY-MM` month.
    pub fn period_summary(&self, user: UserId, month: &str) -> LedgerResult<PeriodSummary> {
        let filter = TransactionFilter {
            month: Some(month.to_string()),
            ..Default::default()
        };
        let txs = store::list_transactions(self.conn, user, &filter)?;
        Ok(stats::summarize(&txs))
    }

    /// Best-effort removal of stored files after a committed delete.
    fn remove_stored_files(&self, attachments: &[Attachment]) {
        for a in attachments {
            if let Err(e) = self.files.delete_stored_file(&a.storage_path) {
                tracing::warn!(
                    attachment_id = a.id,
                    "could not delete stored file {}: {}",
                    a.storage_path,
                    e
                );
            }
        }
    }
}

fn move_to_account(
    conn: &Connection,
    user: UserId,
    mut current: Transaction,
    new_account_id: i64,
) -> LedgerResult<AccountChange> {
    if new_account_id == current.account_id {
        return Ok(AccountChange {
            transaction: current,
            old_account_delta: Decimal::ZERO,
            new_account_delta: Decimal::ZERO,
        });
    }
    let target = owned_account(conn, user, new_account_id)?;
    match current.kind {
        TransactionKind::Repayment { .. } => {
            return Err(LedgerError::RefundInvalidType(current.id));
        }
        TransactionKind::Transfer { to_account_id } if to_account_id == target.id => {
            return Err(LedgerError::InvalidAccountType(target.id));
        }
        _ => {}
    }
    check_account_for(&current.kind, &target)?;

    let undone = apply_postings(conn, &postings(&current), true)?;
    current.account_id = target.id;
    let redone = apply_postings(conn, &postings(&current), false)?;
    Ok(AccountChange {
        transaction: current,
        old_account_delta: undone[0],
        new_account_delta: redone[0],
    })
}
