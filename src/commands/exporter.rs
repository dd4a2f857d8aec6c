// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{TransactionFilter, UserId};
use anyhow::{Context, Result, anyhow};
use serde_json::json;

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(ledger, user, sub),
        _ => Ok(()),
    }
}

fn export_transactions(ledger: &Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .context("format missing")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("out missing")?;

    let mut txs = ledger.list_transactions(user, &TransactionFilter::default())?;
    // Oldest first, like a ledger printout.
    txs.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "account_id",
                "amount",
                "category_id",
                "original_id",
                "note",
            ])?;
            for t in &txs {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    t.account_id.to_string(),
                    format!("{:.2}", t.amount),
                    t.category_id.map(|c| c.to_string()).unwrap_or_default(),
                    t.original_id().map(|o| o.to_string()).unwrap_or_default(),
                    t.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| -> Result<serde_json::Value, serde_json::Error> {
                    let mut v = serde_json::to_value(t)?;
                    v["amount"] = json!(format!("{:.2}", t.amount));
                    Ok(v)
                })
                .collect::<Result<_, _>>()?;
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}
