// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flag() -> Arg {
    arg!(--json "Print JSON instead of a table").action(ArgAction::SetTrue)
}

fn id_arg() -> Arg {
    arg!(--id <ID> "Transaction id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("daftar")
        .about("Chat bookkeeping ledger: accounts, cash movements and reports")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(--db <PATH> "SQLite database file").global(true))
        .arg(
            arg!(--user <ID> "User id that owns the ledger")
                .global(true)
                .value_parser(value_parser!(i64))
                .default_value("1"),
        )
        .subcommand(Command::new("init").about("Create the database and print its location"))
        .subcommand(
            Command::new("say")
                .about("Send one chat message, e.g. '@معاملة دخول إلى @صندوق 500'")
                .arg(arg!(<text> ... "Message text").trailing_var_arg(true)),
        )
        .subcommand(Command::new("shell").about("Read chat messages from stdin, one per line"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand_required(true)
                .subcommand(Command::new("add").arg(arg!(<name> "Account name")))
                .subcommand(
                    Command::new("rename")
                        .arg(arg!(<old> "Current name"))
                        .arg(arg!(<new> "New name")),
                )
                .subcommand(Command::new("rm").arg(arg!(<name> "Account name")))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record from free text, e.g. 'من @صندوق إلى @بنك 1000'")
                        .arg(arg!(<text> "Transaction text")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(arg!(--kind <KIND> "cash_in|cash_out|transfer"))
                        .arg(arg!(--from <ACCOUNT> "Source account"))
                        .arg(arg!(--to <ACCOUNT> "Destination account"))
                        .arg(arg!(--amount <AMOUNT> "Positive amount"))
                        .arg(arg!(--memo <TEXT> "Description")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("show").arg(id_arg()).arg(json_flag()))
                .subcommand(
                    Command::new("list")
                        .arg(
                            arg!(--limit <N> "Max rows (1-10)")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        )
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances, summaries and statements")
                .subcommand_required(true)
                .subcommand(Command::new("accounts").arg(json_flag()))
                .subcommand(Command::new("summary").arg(json_flag()))
                .subcommand(Command::new("monthly"))
                .subcommand(Command::new("statement").arg(arg!(<name> "Account name")))
                .subcommand(Command::new("debtors"))
                .subcommand(Command::new("creditors"))
                .subcommand(Command::new("cash"))
                .subcommand(
                    Command::new("history")
                        .arg(
                            arg!(--limit <N> "Max rows (1-10)")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        )
                        .arg(json_flag()),
                )
                .subcommand(Command::new("types")),
        )
        .subcommand(
            Command::new("export")
                .about("Export transactions")
                .arg(
                    arg!(--format <FORMAT> "csv|json")
                        .required(true)
                        .value_parser(["csv", "json"]),
                )
                .arg(arg!(--out <PATH> "Output file").required(true)),
        )
}
