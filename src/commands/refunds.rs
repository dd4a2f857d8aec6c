// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::date_or_today;
use crate::ledger::Ledger;
use crate::models::{NewRefund, UserId};
use crate::utils::{fmt_money, parse_decimal};
use anyhow::{Context, Result};

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let original_id = *sub.get_one::<i64>("original").context("original missing")?;
            let amount =
                parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;
            let refund = ledger.create_refund(
                user,
                NewRefund {
                    original_id,
                    amount,
                    date: date_or_today(sub, "date")?,
                    note: sub.get_one::<String>("note").cloned(),
                },
            )?;
            let left = ledger.refundable_amount(user, original_id)?;
            println!(
                "Refund #{} of {} against #{} ({} still refundable)",
                refund.id,
                fmt_money(&refund.amount),
                original_id,
                fmt_money(&left)
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id missing")?;
            ledger.delete_refund(user, id)?;
            println!("Deleted refund #{}", id);
        }
        Some(("status", sub)) => {
            let original_id = *sub.get_one::<i64>("original").context("original missing")?;
            let left = ledger.refundable_amount(user, original_id)?;
            println!("#{}: {} refundable", original_id, fmt_money(&left));
        }
        _ => {}
    }
    Ok(())
}
