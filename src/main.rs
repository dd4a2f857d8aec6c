// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tallybook::files::FsFileStore;
use tallybook::{Ledger, LedgerError, cli, commands, db, logging, utils};

fn main() {
    logging::init();
    if let Err(e) = run() {
        match e.downcast_ref::<LedgerError>() {
            Some(le) => eprintln!("error[{}]: {}", le.code(), le),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let user = utils::resolve_user(&conn, matches.get_one::<i64>("user").copied())?;
    let files = FsFileStore::new(db::attachments_dir()?);

    if let Some(("init", sub)) = matches.subcommand() {
        if let Some(u) = sub.get_one::<i64>("default-user") {
            utils::set_setting(&conn, "default_user", &u.to_string())?;
            println!("Default user set to {}", u);
        }
        println!("Database initialized at {}", db::db_path()?.display());
        return Ok(());
    }

    let mut ledger = Ledger::new(&mut conn, &files);
    match matches.subcommand() {
        Some(("account", sub)) => commands::accounts::handle(&mut ledger, user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut ledger, user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut ledger, user, sub)?,
        Some(("refund", sub)) => commands::refunds::handle(&mut ledger, user, sub)?,
        Some(("repay", sub)) => commands::repayments::handle(&mut ledger, user, sub)?,
        Some(("attach", sub)) => commands::attachments::handle(&mut ledger, user, sub)?,
        Some(("remind", sub)) => commands::reminders::handle(&mut ledger, user, sub)?,
        Some(("stats", sub)) => commands::stats::handle(&mut ledger, user, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&mut ledger, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
