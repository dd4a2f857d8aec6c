// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::UserId;
use crate::utils::pretty_table;
use anyhow::{Context, Result};

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("name missing")?;
            let cat = ledger.create_category(user, name)?;
            println!("Added category '{}' (id {})", cat.name, cat.id);
        }
        Some(("list", _)) => {
            let data = ledger
                .list_categories(user)?
                .into_iter()
                .map(|c| vec![c.id.to_string(), c.name])
                .collect();
            println!("{}", pretty_table(&["ID", "Category"], data));
        }
        _ => {}
    }
    Ok(())
}
