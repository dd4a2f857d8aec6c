// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::date_or_today;
use crate::ledger::Ledger;
use crate::models::{
    EntryKind, NewTransaction, Transaction, TransactionChanges, TransactionFilter,
    TransactionKind, UserId,
};
use crate::utils::{
    fmt_money, id_for_account, id_for_category, maybe_print_json, parse_date, parse_decimal,
    parse_month, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, user, sub)?,
        Some(("list", sub)) => list(ledger, user, sub)?,
        Some(("edit", sub)) => edit(ledger, user, sub)?,
        Some(("move", sub)) => move_account(ledger, user, sub)?,
        Some(("rm", sub)) => remove(ledger, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let conn = ledger.connection();
    let account_name = sub.get_one::<String>("account").context("account missing")?;
    let account_id = id_for_account(conn, user, account_name)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;
    let category_id = match sub.get_one::<String>("category") {
        Some(cat) => Some(id_for_category(conn, user, cat)?),
        None => None,
    };
    let kind = match sub.get_one::<String>("type").map(String::as_str) {
        Some("income") => EntryKind::Income,
        Some("transfer") => {
            let to = sub
                .get_one::<String>("to")
                .context("transfers need --to")?;
            EntryKind::Transfer {
                to_account_id: id_for_account(conn, user, to)?,
            }
        }
        _ => EntryKind::Expense,
    };
    let new = NewTransaction {
        kind,
        amount,
        account_id,
        category_id,
        date: date_or_today(sub, "date")?,
        note: sub.get_one::<String>("note").cloned(),
    };

    let tx = ledger.create(user, new)?;
    println!(
        "Recorded {} #{} of {} on {} (acct: {})",
        tx.kind.as_str(),
        tx.id,
        fmt_money(&tx.amount),
        tx.date,
        account_name
    );
    Ok(())
}

fn list(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ledger, user, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.r#type.clone(),
                    r.account.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.link.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Date", "Type", "Account", "Amount", "Category", "Link", "Note"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub r#type: String,
    pub account: String,
    pub amount: String,
    pub category: String,
    /// Refund original, repayment source or transfer destination.
    pub link: String,
    pub note: String,
}

fn account_name(conn: &Connection, id: i64) -> Result<String> {
    Ok(crate::store::find_account(conn, id)?
        .map(|a| a.name)
        .unwrap_or_else(|| format!("#{}", id)))
}

fn to_row(conn: &Connection, tx: &Transaction) -> Result<TransactionRow> {
    let link = match tx.kind {
        TransactionKind::Refund { original_id } => format!("refund of #{}", original_id),
        TransactionKind::Repayment {
            source_account_id, ..
        } => format!("from {}", account_name(conn, source_account_id)?),
        TransactionKind::Transfer { to_account_id } => {
            format!("to {}", account_name(conn, to_account_id)?)
        }
        TransactionKind::Income | TransactionKind::Expense => String::new(),
    };
    let category = match tx.category_id {
        Some(id) => crate::store::find_category(conn, id)?
            .map(|c| c.name)
            .unwrap_or_default(),
        None => String::new(),
    };
    Ok(TransactionRow {
        id: tx.id,
        date: tx.date.to_string(),
        r#type: tx.kind.as_str().to_string(),
        account: account_name(conn, tx.account_id)?,
        amount: fmt_money(&tx.amount),
        category,
        link,
        note: tx.note.clone().unwrap_or_default(),
    })
}

pub fn query_rows(
    ledger: &Ledger,
    user: UserId,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let conn = ledger.connection();
    let mut filter = TransactionFilter::default();
    if let Some(month) = sub.get_one::<String>("month") {
        filter.month = Some(parse_month(month)?);
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        filter.account_id = Some(id_for_account(conn, user, acct)?);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        filter.category_id = Some(id_for_category(conn, user, cat)?);
    }
    filter.limit = sub.get_one::<usize>("limit").copied();

    let txs = ledger.list_transactions(user, &filter)?;
    txs.iter().map(|tx| to_row(conn, tx)).collect()
}

fn edit(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id missing")?;
    let conn = ledger.connection();
    let mut changes = TransactionChanges::default();
    if let Some(a) = sub.get_one::<String>("amount") {
        changes.amount = Some(parse_decimal(a)?);
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        changes.account_id = Some(id_for_account(conn, user, acct)?);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        changes.category_id = if cat.trim().is_empty() {
            Some(None)
        } else {
            Some(Some(id_for_category(conn, user, cat)?))
        };
    }
    if let Some(d) = sub.get_one::<String>("date") {
        changes.date = Some(parse_date(d)?);
    }
    if let Some(n) = sub.get_one::<String>("note") {
        changes.note = Some(Some(n.clone()).filter(|n| !n.trim().is_empty()));
    }
    let tx = ledger.update(user, id, changes)?;
    println!("Updated {} #{} ({})", tx.kind.as_str(), tx.id, fmt_money(&tx.amount));
    Ok(())
}

fn move_account(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id missing")?;
    let name = sub.get_one::<String>("account").context("account missing")?;
    let account_id = id_for_account(ledger.connection(), user, name)?;
    let change = ledger.change_account(user, id, account_id)?;
    println!(
        "Moved #{} to '{}' (old account {}, new account {})",
        id,
        name,
        fmt_money(&change.old_account_delta),
        fmt_money(&change.new_account_delta)
    );
    Ok(())
}

fn remove(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("id missing")?;
    let outcome = ledger.delete(user, id)?;
    println!(
        "Deleted #{} ({} refunds, {} attachments)",
        outcome.transaction_id,
        outcome.refund_ids.len(),
        outcome.attachment_ids.len()
    );
    Ok(())
}
