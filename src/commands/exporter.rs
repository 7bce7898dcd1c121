// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::commands::transactions::list_all;
use crate::models::UserId;
use crate::utils::{required_arg, timestamp_to_db};

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    let fmt = required_arg(m, "format")?.to_lowercase();
    let out = required_arg(m, "out")?;
    let n = export_transactions(conn, user, &fmt, Path::new(out))?;
    println!("Exported {} transactions to {}", n, out);
    Ok(())
}

/// Writes every transaction of `user`, oldest first. Returns the row count.
pub fn export_transactions(conn: &Connection, user: UserId, fmt: &str, out: &Path) -> Result<usize> {
    let rows = list_all(conn, user)?;

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "created_at",
                "kind",
                "from_account",
                "to_account",
                "amount",
                "memo",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    timestamp_to_db(&t.created_at),
                    t.kind.as_str().to_string(),
                    t.from_account.clone().unwrap_or_default(),
                    t.to_account.clone().unwrap_or_default(),
                    t.amount.to_string(),
                    t.memo.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "created_at": timestamp_to_db(&t.created_at),
                        "kind": t.kind.as_str(),
                        "from_account": t.from_account,
                        "to_account": t.to_account,
                        "amount": t.amount.to_string(),
                        "memo": t.memo,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    log::info!("exported {} transactions of user {} as {}", rows.len(), user, fmt);
    Ok(rows.len())
}
