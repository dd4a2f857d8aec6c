// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tallybook", "tallybook"));

fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.to_path_buf())
}

/// Database file, `TALLYBOOK_DB` wins over the platform data dir.
pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os("TALLYBOOK_DB") {
        return Ok(PathBuf::from(p));
    }
    Ok(data_dir()?.join("tallybook.sqlite"))
}

/// Directory holding stored attachment files, `TALLYBOOK_ATTACHMENTS` wins.
pub fn attachments_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TALLYBOOK_ATTACHMENTS") {
        Some(p) => PathBuf::from(p),
        None => data_dir()?.join("attachments"),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create attachments dir {}", dir.display()))?;
    Ok(dir)
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!("opened ledger database at {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('cash','bank','alipay','wechat','credit','investment','other')),
        balance TEXT NOT NULL DEFAULT '0',
        credit_limit TEXT,
        billing_day INTEGER CHECK(billing_day BETWEEN 1 AND 28),
        due_day INTEGER CHECK(due_day BETWEEN 1 AND 28),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(owner_id, name),
        CHECK((type = 'credit') = (credit_limit IS NOT NULL AND billing_day IS NOT NULL AND due_day IS NOT NULL))
    );
    CREATE INDEX IF NOT EXISTS idx_accounts_owner ON accounts(owner_id);

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(owner_id, name)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','refund','repayment','transfer')),
        amount TEXT NOT NULL,
        account_id INTEGER NOT NULL,
        source_account_id INTEGER,
        to_account_id INTEGER,
        original_transaction_id INTEGER,
        category_id INTEGER,
        date TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK((type = 'refund') = (original_transaction_id IS NOT NULL)),
        CHECK((type = 'repayment') = (source_account_id IS NOT NULL)),
        CHECK((type = 'transfer') = (to_account_id IS NOT NULL)),
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(source_account_id) REFERENCES accounts(id),
        FOREIGN KEY(to_account_id) REFERENCES accounts(id),
        FOREIGN KEY(original_transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_original ON transactions(original_transaction_id);

    CREATE TABLE IF NOT EXISTS attachments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        transaction_id INTEGER,
        storage_path TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_attachments_transaction ON attachments(transaction_id);
    "#,
    )?;
    Ok(())
}
