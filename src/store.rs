// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-level access to the ledger tables.
//!
//! Every function takes a plain `&Connection` so it can run either on a
//! connection or inside a `rusqlite::Transaction` (which derefs to one).
//! None of these functions enforce business rules or ownership; that is the
//! ledger's job.

use crate::models::{
    Account, AccountKind, Attachment, Category, CreditTerms, Transaction, TransactionFilter,
    TransactionKind, UserId,
};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use rust_decimal::Decimal;

fn decimal_at(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_decimal_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        s.parse::<Decimal>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

// ---------- accounts ----------

const ACCOUNT_COLS: &str =
    "id, owner_id, name, type, balance, credit_limit, billing_day, due_day";

fn map_account(r: &Row) -> rusqlite::Result<Account> {
    let typ: String = r.get(3)?;
    let kind = if typ == "credit" {
        let limit = opt_decimal_at(r, 5)?.unwrap_or(Decimal::ZERO);
        let billing_day: u32 = r.get(6)?;
        let due_day: u32 = r.get(7)?;
        AccountKind::Credit(CreditTerms {
            limit,
            billing_day,
            due_day,
        })
    } else {
        AccountKind::parse_plain(&typ).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                format!("unknown account type '{}'", typ).into(),
            )
        })?
    };
    Ok(Account {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        kind,
        balance: decimal_at(r, 4)?,
    })
}

pub fn insert_account(
    conn: &Connection,
    owner_id: UserId,
    name: &str,
    kind: &AccountKind,
    balance: Decimal,
) -> rusqlite::Result<i64> {
    let terms = kind.credit_terms();
    conn.execute(
        "INSERT INTO accounts(owner_id, name, type, balance, credit_limit, billing_day, due_day)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            owner_id,
            name,
            kind.as_str(),
            balance.to_string(),
            terms.map(|t| t.limit.to_string()),
            terms.map(|t| t.billing_day),
            terms.map(|t| t.due_day),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_account(conn: &Connection, id: i64) -> rusqlite::Result<Option<Account>> {
    conn.query_row(
        &format!("SELECT {} FROM accounts WHERE id=?1", ACCOUNT_COLS),
        params![id],
        map_account,
    )
    .optional()
}

pub fn list_accounts(conn: &Connection, owner_id: UserId) -> rusqlite::Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts WHERE owner_id=?1 ORDER BY name",
        ACCOUNT_COLS
    ))?;
    let rows = stmt.query_map(params![owner_id], map_account)?;
    rows.collect()
}

pub fn account_id_by_name(
    conn: &Connection,
    owner_id: UserId,
    name: &str,
) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM accounts WHERE owner_id=?1 AND name=?2",
        params![owner_id, name],
        |r| r.get(0),
    )
    .optional()
}

/// Add `delta` to the stored balance and return the new balance.
pub fn adjust_balance(conn: &Connection, id: i64, delta: Decimal) -> rusqlite::Result<Decimal> {
    let current = conn.query_row(
        "SELECT balance FROM accounts WHERE id=?1",
        params![id],
        |r| decimal_at(r, 0),
    )?;
    let next = current + delta;
    conn.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2",
        params![next.to_string(), id],
    )?;
    Ok(next)
}

pub fn set_balance(conn: &Connection, id: i64, balance: Decimal) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2",
        params![balance.to_string(), id],
    )?;
    Ok(())
}

// ---------- categories ----------

pub fn insert_category(conn: &Connection, owner_id: UserId, name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO categories(owner_id, name) VALUES (?1, ?2)",
        params![owner_id, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, owner_id, name FROM categories WHERE id=?1",
        params![id],
        |r| {
            Ok(Category {
                id: r.get(0)?,
                owner_id: r.get(1)?,
                name: r.get(2)?,
            })
        },
    )
    .optional()
}

pub fn list_categories(conn: &Connection, owner_id: UserId) -> rusqlite::Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, owner_id, name FROM categories WHERE owner_id=?1 ORDER BY name")?;
    let rows = stmt.query_map(params![owner_id], |r| {
        Ok(Category {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            name: r.get(2)?,
        })
    })?;
    rows.collect()
}

pub fn category_id_by_name(
    conn: &Connection,
    owner_id: UserId,
    name: &str,
) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM categories WHERE owner_id=?1 AND name=?2",
        params![owner_id, name],
        |r| r.get(0),
    )
    .optional()
}

// ---------- transactions ----------

const TX_COLS: &str = "id, owner_id, type, amount, account_id, source_account_id, to_account_id, \
                       original_transaction_id, category_id, date, note";

fn map_transaction(r: &Row) -> rusqlite::Result<Transaction> {
    let typ: String = r.get(2)?;
    let kind = match typ.as_str() {
        "income" => TransactionKind::Income,
        "expense" => TransactionKind::Expense,
        "refund" => TransactionKind::Refund {
            original_id: r.get(7)?,
        },
        "repayment" => TransactionKind::Repayment {
            source_account_id: r.get(5)?,
        },
        "transfer" => TransactionKind::Transfer {
            to_account_id: r.get(6)?,
        },
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown transaction type '{}'", other).into(),
            ));
        }
    };
    Ok(Transaction {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        kind,
        amount: decimal_at(r, 3)?,
        account_id: r.get(4)?,
        category_id: r.get(8)?,
        date: r.get(9)?,
        note: r.get(10)?,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn insert_transaction(
    conn: &Connection,
    owner_id: UserId,
    kind: &TransactionKind,
    amount: Decimal,
    account_id: i64,
    category_id: Option<i64>,
    date: NaiveDate,
    note: Option<&str>,
) -> rusqlite::Result<i64> {
    let (source, to, original) = match *kind {
        TransactionKind::Income | TransactionKind::Expense => (None, None, None),
        TransactionKind::Refund { original_id } => (None, None, Some(original_id)),
        TransactionKind::Repayment { source_account_id } => (Some(source_account_id), None, None),
        TransactionKind::Transfer { to_account_id } => (None, Some(to_account_id), None),
    };
    conn.execute(
        "INSERT INTO transactions(owner_id, type, amount, account_id, source_account_id, to_account_id,
                                  original_transaction_id, category_id, date, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            owner_id,
            kind.as_str(),
            amount.to_string(),
            account_id,
            source,
            to,
            original,
            category_id,
            date,
            note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_transaction(conn: &Connection, id: i64) -> rusqlite::Result<Option<Transaction>> {
    conn.query_row(
        &format!("SELECT {} FROM transactions WHERE id=?1", TX_COLS),
        params![id],
        map_transaction,
    )
    .optional()
}

/// Persist the mutable fields of an existing row.
pub fn update_transaction(conn: &Connection, tx: &Transaction) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE transactions SET amount=?1, account_id=?2, category_id=?3, date=?4, note=?5 WHERE id=?6",
        params![
            tx.amount.to_string(),
            tx.account_id,
            tx.category_id,
            tx.date,
            tx.note,
            tx.id
        ],
    )?;
    Ok(())
}

pub fn list_transactions(
    conn: &Connection,
    owner_id: UserId,
    filter: &TransactionFilter,
) -> rusqlite::Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE owner_id=?", TX_COLS);
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(owner_id)];

    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        args.push(Box::new(month.clone()));
    }
    if let Some(acct) = filter.account_id {
        sql.push_str(" AND (account_id=? OR source_account_id=? OR to_account_id=?)");
        args.push(Box::new(acct));
        args.push(Box::new(acct));
        args.push(Box::new(acct));
    }
    if let Some(cat) = filter.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Box::new(cat));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        args.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), map_transaction)?;
    rows.collect()
}

/// Every transaction booked against `account_id` (the account field only).
pub fn transactions_on_account(
    conn: &Connection,
    account_id: i64,
) -> rusqlite::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE account_id=?1 ORDER BY date, id",
        TX_COLS
    ))?;
    let rows = stmt.query_map(params![account_id], map_transaction)?;
    rows.collect()
}

pub fn refunds_of(conn: &Connection, original_id: i64) -> rusqlite::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE original_transaction_id=?1 ORDER BY id",
        TX_COLS
    ))?;
    let rows = stmt.query_map(params![original_id], map_transaction)?;
    rows.collect()
}

pub fn refunded_total(conn: &Connection, original_id: i64) -> rusqlite::Result<Decimal> {
    Ok(refunds_of(conn, original_id)?
        .iter()
        .map(|r| r.amount)
        .sum())
}

pub fn delete_transactions(conn: &Connection, ids: &[i64]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached("DELETE FROM transactions WHERE id=?1")?;
    let mut n = 0;
    for id in ids {
        n += stmt.execute(params![id])?;
    }
    Ok(n)
}

// ---------- attachments ----------

fn map_attachment(r: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        transaction_id: r.get(2)?,
        storage_path: r.get(3)?,
    })
}

pub fn insert_attachment(
    conn: &Connection,
    owner_id: UserId,
    storage_path: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO attachments(owner_id, storage_path) VALUES (?1, ?2)",
        params![owner_id, storage_path],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_attachment(conn: &Connection, id: i64) -> rusqlite::Result<Option<Attachment>> {
    conn.query_row(
        "SELECT id, owner_id, transaction_id, storage_path FROM attachments WHERE id=?1",
        params![id],
        map_attachment,
    )
    .optional()
}

pub fn list_attachments(conn: &Connection, owner_id: UserId) -> rusqlite::Result<Vec<Attachment>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, transaction_id, storage_path FROM attachments WHERE owner_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![owner_id], map_attachment)?;
    rows.collect()
}

pub fn attachments_of(conn: &Connection, transaction_id: i64) -> rusqlite::Result<Vec<Attachment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, transaction_id, storage_path FROM attachments WHERE transaction_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![transaction_id], map_attachment)?;
    rows.collect()
}

pub fn set_attachment_transaction(
    conn: &Connection,
    id: i64,
    transaction_id: Option<i64>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE attachments SET transaction_id=?1 WHERE id=?2",
        params![transaction_id, id],
    )?;
    Ok(())
}

pub fn delete_attachments(conn: &Connection, ids: &[i64]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached("DELETE FROM attachments WHERE id=?1")?;
    let mut n = 0;
    for id in ids {
        n += stmt.execute(params![id])?;
    }
    Ok(n)
}
