// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::UserId;
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::{Context, Result};

pub fn handle(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").context("month missing")?)?;
    let summary = ledger.period_summary(user, &month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        return Ok(());
    }

    let totals = vec![
        vec!["Income".to_string(), fmt_money(&summary.total_income)],
        vec!["Expense".to_string(), fmt_money(&summary.total_expense)],
        vec!["Refunds".to_string(), fmt_money(&summary.total_refund)],
        vec!["Net expense".to_string(), fmt_money(&summary.net_expense)],
        vec!["Balance".to_string(), fmt_money(&summary.balance)],
    ];
    println!("{}", pretty_table(&[month.as_str(), ""], totals));

    let mut rows = Vec::new();
    for c in &summary.categories {
        let name = match c.category_id {
            Some(id) => store::find_category(ledger.connection(), id)?
                .map(|c| c.name)
                .unwrap_or_else(|| format!("#{}", id)),
            None => "(uncategorized)".to_string(),
        };
        rows.push(vec![
            name,
            fmt_money(&c.expense),
            fmt_money(&c.refund),
            fmt_money(&c.net),
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Category", "Expense", "Refunds", "Net"], rows)
    );
    Ok(())
}
