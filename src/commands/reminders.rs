// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::date_or_today;
use crate::ledger::Ledger;
use crate::models::UserId;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let today = date_or_today(sub, "today")?;
    let reminders = ledger.due_reminders(user, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &reminders)? {
        return Ok(());
    }
    if reminders.is_empty() {
        println!("No credit payments due");
        return Ok(());
    }
    let mut rows = Vec::new();
    for r in &reminders {
        let account = ledger.get_account(user, r.account_id)?;
        let status = if r.is_overdue {
            "overdue".to_string()
        } else {
            format!("due in {} days", r.days_until_due)
        };
        rows.push(vec![
            account.name,
            fmt_money(&r.outstanding),
            r.due_date.to_string(),
            status,
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Account", "Outstanding", "Due", "Status"], rows)
    );
    Ok(())
}
