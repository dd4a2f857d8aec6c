// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::UserId;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let path = sub.get_one::<String>("path").context("path missing")?;
            let a = ledger.attach_file(user, Path::new(path.trim()))?;
            println!("Stored {} as attachment #{} ({})", path, a.id, a.storage_path);
        }
        Some(("link", sub)) => {
            let tx_id = *sub.get_one::<i64>("tx").context("tx missing")?;
            let ids: Vec<i64> = sub
                .get_many::<i64>("ids")
                .context("ids missing")?
                .copied()
                .collect();
            let linked = ledger.link_attachments(user, &ids, tx_id)?;
            println!("Linked {} attachments to #{}", linked.len(), tx_id);
        }
        Some(("unlink", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id missing")?;
            ledger.unlink_attachment(user, id)?;
            println!("Unlinked attachment #{}", id);
        }
        Some(("list", sub)) => {
            let items = match sub.get_one::<i64>("tx") {
                Some(tx_id) => ledger.attachments_for(user, *tx_id)?,
                None => ledger.list_attachments(user)?,
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                let rows = items
                    .into_iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.transaction_id.map(|t| t.to_string()).unwrap_or_default(),
                            a.storage_path,
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Transaction", "Path"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
