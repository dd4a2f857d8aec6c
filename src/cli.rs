// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .help("YYYY-MM-DD, defaults to today")
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .help("Evaluate as of this YYYY-MM-DD instead of today")
}

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .about("Family bookkeeping ledger with credit-card reconciliation")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("TALLYBOOK_USER")
                .value_parser(value_parser!(i64))
                .help("Act as this user id"),
        )
        .subcommand(
            Command::new("init").about("Create the database").arg(
                Arg::new("default-user")
                    .long("default-user")
                    .value_parser(value_parser!(i64))
                    .help("Store the user id used when --user is absent"),
            ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .ignore_case(true)
                                .value_parser([
                                    "cash",
                                    "bank",
                                    "alipay",
                                    "wechat",
                                    "credit",
                                    "investment",
                                    "other",
                                ]),
                        )
                        .arg(Arg::new("balance").long("balance").default_value("0"))
                        .arg(Arg::new("limit").long("limit"))
                        .arg(
                            Arg::new("billing-day")
                                .long("billing-day")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Credit summary for a credit account")
                        .arg(Arg::new("name").required(true))
                        .arg(today_arg()),
                )),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .value_parser(["income", "expense", "transfer"]),
                        )
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .help("Receiving account for transfers"),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(date_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("month").long("month"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("id"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(date_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("move")
                        .about("Move a transaction to another account")
                        .arg(id_arg("id"))
                        .arg(Arg::new("account").long("account").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("refund")
                .about("Refund part of an expense")
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("original"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(date_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id")))
                .subcommand(Command::new("status").arg(id_arg("original"))),
        )
        .subcommand(
            Command::new("repay")
                .about("Pay down a credit account")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("card").long("card").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(date_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("attach")
                .about("Manage transaction attachments")
                .subcommand(Command::new("add").arg(Arg::new("path").required(true)))
                .subcommand(
                    Command::new("link").arg(id_arg("tx")).arg(
                        Arg::new("ids")
                            .required(true)
                            .num_args(1..)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(Command::new("unlink").arg(id_arg("id")))
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("tx")
                            .long("tx")
                            .value_parser(value_parser!(i64)),
                    ),
                )),
        )
        .subcommand(json_flags(
            Command::new("remind")
                .about("Credit accounts due soon or overdue")
                .arg(today_arg()),
        ))
        .subcommand(json_flags(
            Command::new("stats")
                .about("Monthly income, expense and refund totals")
                .arg(Arg::new("month").long("month").required(true)),
        ))
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
}
