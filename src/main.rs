// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use daftar::commands::chat::Dispatcher;
use daftar::{cli, commands, config::Settings, db};

fn main() -> Result<()> {
    env_logger::init();

    let matches = cli::build_cli().get_matches();
    let mut settings = Settings::load();
    if let Some(path) = matches.get_one::<String>("db") {
        settings.db_path = Some(PathBuf::from(path));
    }
    let user = matches.get_one::<i64>("user").copied().unwrap_or(1);

    let db_path = settings.resolved_db_path()?;
    let mut conn = db::open_or_init(&db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            commands::accounts::ensure_user(&conn, user)?;
            println!("Database initialized at {}", db_path.display());
        }
        Some(("say", sub)) => {
            let text = sub
                .get_many::<String>("text")
                .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let mut chat = Dispatcher::new(&settings);
            println!("{}", chat.handle_message(&mut conn, user, user, &text));
        }
        Some(("shell", _)) => {
            let mut chat = Dispatcher::new(&settings);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                writeln!(stdout, "{}\n", chat.handle_message(&mut conn, user, user, &line))?;
                stdout.flush()?;
            }
        }
        Some(("account", sub)) => commands::accounts::handle(&mut conn, user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, user, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, user, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
