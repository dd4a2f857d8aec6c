// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::date_or_today;
use crate::ledger::Ledger;
use crate::models::{AccountKind, CreditTerms, UserId};
use crate::utils::{fmt_money, id_for_account, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, user, sub)?,
        Some(("list", sub)) => list(ledger, user, sub)?,
        Some(("show", sub)) => show(ledger, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").context("name missing")?;
    let typ = sub
        .get_one::<String>("type")
        .context("type missing")?
        .trim()
        .to_lowercase();
    let balance = parse_decimal(sub.get_one::<String>("balance").context("balance missing")?)?;

    let kind = if typ == "credit" {
        let limit = parse_decimal(
            sub.get_one::<String>("limit")
                .context("credit accounts need --limit")?,
        )?;
        let billing_day = *sub
            .get_one::<u32>("billing-day")
            .context("credit accounts need --billing-day")?;
        let due_day = *sub
            .get_one::<u32>("due-day")
            .context("credit accounts need --due-day")?;
        AccountKind::Credit(CreditTerms {
            limit,
            billing_day,
            due_day,
        })
    } else {
        if sub.get_one::<String>("limit").is_some() {
            return Err(anyhow!("--limit only applies to credit accounts"));
        }
        AccountKind::parse_plain(&typ).with_context(|| format!("Unknown account type '{}'", typ))?
    };

    let account = ledger.create_account(user, name, kind, balance)?;
    println!(
        "Added account '{}' ({}, balance {})",
        account.name,
        account.kind.as_str(),
        fmt_money(&account.balance)
    );
    Ok(())
}

fn list(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = ledger.list_accounts(user)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        return Ok(());
    }
    let mut data = Vec::new();
    for a in &accounts {
        let (limit, outstanding) = match a.kind.credit_terms() {
            Some(t) => (
                fmt_money(&t.limit),
                fmt_money(&ledger.outstanding_balance(user, a.id)?),
            ),
            None => (String::new(), String::new()),
        };
        data.push(vec![
            a.id.to_string(),
            a.name.clone(),
            a.kind.as_str().to_string(),
            fmt_money(&a.balance),
            limit,
            outstanding,
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Type", "Balance", "Limit", "Outstanding"],
            data
        )
    );
    Ok(())
}

fn show(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").context("name missing")?;
    let today = date_or_today(sub, "today")?;
    let id = id_for_account(ledger.connection(), user, name)?;
    let summary = ledger.credit_summary(user, id, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Limit".to_string(), fmt_money(&summary.limit)],
        vec!["Outstanding".to_string(), fmt_money(&summary.outstanding)],
        vec!["Available".to_string(), fmt_money(&summary.available)],
        vec![
            "Overpayment credit".to_string(),
            fmt_money(&summary.overpayment_credit),
        ],
        vec![
            "Statement period".to_string(),
            format!("{} .. {}", summary.statement.start, summary.statement.end),
        ],
        vec![
            "Statement spend".to_string(),
            fmt_money(&summary.statement_spend),
        ],
    ];
    println!("{}", pretty_table(&[name.as_str(), ""], rows));
    Ok(())
}
