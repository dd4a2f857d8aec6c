// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::date_or_today;
use crate::ledger::Ledger;
use crate::models::{NewRepayment, UserId};
use crate::utils::{fmt_money, id_for_account, id_for_category, parse_decimal};
use anyhow::{Context, Result};

pub fn handle(ledger: &mut Ledger, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, user, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id missing")?;
            ledger.delete_repayment(user, id)?;
            println!("Deleted repayment #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(ledger: &mut Ledger, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let conn = ledger.connection();
    let card = sub.get_one::<String>("card").context("card missing")?;
    let from = sub.get_one::<String>("from").context("from missing")?;
    let credit_account_id = id_for_account(conn, user, card)?;
    let source_account_id = id_for_account(conn, user, from)?;
    let category_id = match sub.get_one::<String>("category") {
        Some(cat) => Some(id_for_category(conn, user, cat)?),
        None => None,
    };
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;

    let repayment = ledger.create_repayment(
        user,
        NewRepayment {
            credit_account_id,
            source_account_id,
            amount,
            category_id,
            date: date_or_today(sub, "date")?,
            note: sub.get_one::<String>("note").cloned(),
        },
    )?;
    let outstanding = ledger.outstanding_balance(user, credit_account_id)?;
    print!(
        "Repaid {} on '{}' from '{}' (outstanding now {})",
        fmt_money(&repayment.amount),
        card,
        from,
        fmt_money(&outstanding)
    );
    let credit = ledger.get_account(user, credit_account_id)?.balance;
    if !credit.is_zero() {
        print!(", {} held as overpayment credit", fmt_money(&credit));
    }
    println!();
    Ok(())
}
