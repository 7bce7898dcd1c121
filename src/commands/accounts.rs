// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, Result};
use crate::models::{Account, Classification, UserId};
use crate::utils::{
    decimal_from_db, fmt_money, maybe_print_json, pretty_table, required_arg, validate_account_name,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

pub const MAX_ACCOUNTS: usize = 5;

// First matching keyword set wins; cash and bank both count as assets.
const CLASSIFICATION_RULES: &[(&[&str], Classification)] = &[
    (&["صندوق", "نقد", "كاش", "خزنة", "محفظة"], Classification::Asset),
    (&["بنك", "مصرف", "حساب_جاري", "توفير"], Classification::Asset),
    (&["عميل", "زبون", "مشتري"], Classification::ForUs),
    (&["مورد", "بائع", "مقاول"], Classification::ForThem),
    (
        &["مصروف", "مصاريف", "تكلفة", "إيجار", "راتب", "كهرباء", "ماء"],
        Classification::Expense,
    ),
    (&["مبيعات", "إيراد", "دخل", "ربح"], Classification::Revenue),
];

pub fn classify(name: &str) -> Classification {
    let lowered = name.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, class)| *class)
        .unwrap_or(Classification::General)
}

pub fn ensure_user(conn: &Connection, user: UserId) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO users(id) VALUES (?1)", params![user])?;
    Ok(())
}

pub fn create_account(conn: &mut Connection, user: UserId, name: &str) -> Result<Account> {
    let name = validate_account_name(name)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_user(&tx, user)?;

    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM accounts WHERE user_id=?1",
        params![user],
        |r| r.get(0),
    )?;
    if count >= MAX_ACCOUNTS as i64 {
        return Err(LedgerError::AccountLimit(MAX_ACCOUNTS));
    }
    if account_exists(&tx, user, name)? {
        return Err(LedgerError::DuplicateAccount(name.to_string()));
    }

    let classification = classify(name);
    tx.execute(
        "INSERT INTO accounts(user_id, name, balance, account_type) VALUES (?1, ?2, '0', ?3)",
        params![user, name, classification.as_str()],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    log::info!("user {} added account '{}' ({})", user, name, classification);

    Ok(Account {
        id,
        user_id: user,
        name: name.to_string(),
        balance: rust_decimal::Decimal::ZERO,
        classification,
    })
}

/// Renames an account, reclassifies it, and points its transactions at the new name.
pub fn rename_account(
    conn: &mut Connection,
    user: UserId,
    old_name: &str,
    new_name: &str,
) -> Result<Account> {
    let new_name = validate_account_name(new_name)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !account_exists(&tx, user, old_name)? {
        return Err(LedgerError::AccountNotFound(old_name.to_string()));
    }
    if account_exists(&tx, user, new_name)? {
        return Err(LedgerError::DuplicateAccount(new_name.to_string()));
    }

    let classification = classify(new_name);
    tx.execute(
        "UPDATE accounts SET name=?1, account_type=?2 WHERE user_id=?3 AND name=?4",
        params![new_name, classification.as_str(), user, old_name],
    )?;
    tx.execute(
        "UPDATE transactions SET from_account=?1 WHERE user_id=?2 AND from_account=?3",
        params![new_name, user, old_name],
    )?;
    tx.execute(
        "UPDATE transactions SET to_account=?1 WHERE user_id=?2 AND to_account=?3",
        params![new_name, user, old_name],
    )?;

    let account = get_account(&tx, user, new_name)?
        .ok_or_else(|| LedgerError::AccountNotFound(new_name.to_string()))?;
    tx.commit()?;
    log::info!("user {} renamed account '{}' -> '{}'", user, old_name, new_name);
    Ok(account)
}

/// Deletes an account and every transaction that mentions it.
/// Returns the number of transactions removed.
pub fn delete_account(conn: &mut Connection, user: UserId, name: &str) -> Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !account_exists(&tx, user, name)? {
        return Err(LedgerError::AccountNotFound(name.to_string()));
    }
    let deleted = tx.execute(
        "DELETE FROM transactions WHERE user_id=?1 AND (from_account=?2 OR to_account=?2)",
        params![user, name],
    )?;
    tx.execute(
        "DELETE FROM accounts WHERE user_id=?1 AND name=?2",
        params![user, name],
    )?;
    tx.commit()?;
    log::info!(
        "user {} deleted account '{}' with {} transactions",
        user,
        name,
        deleted
    );
    Ok(deleted)
}

pub fn list_accounts(conn: &Connection, user: UserId) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, balance, account_type FROM accounts
         WHERE user_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![user], raw_account)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_account(row?)?);
    }
    Ok(out)
}

pub fn get_account(conn: &Connection, user: UserId, name: &str) -> Result<Option<Account>> {
    let raw = conn
        .query_row(
            "SELECT id, user_id, name, balance, account_type FROM accounts
             WHERE user_id=?1 AND name=?2",
            params![user, name],
            raw_account,
        )
        .optional()?;
    raw.map(into_account).transpose()
}

pub(crate) fn account_exists(conn: &Connection, user: UserId, name: &str) -> Result<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM accounts WHERE user_id=?1 AND name=?2",
            params![user, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

type RawAccount = (i64, i64, String, String, String);

fn raw_account(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn into_account((id, user_id, name, balance, class): RawAccount) -> Result<Account> {
    Ok(Account {
        id,
        user_id,
        name,
        balance: decimal_from_db("accounts.balance", &balance)?,
        classification: class.parse()?,
    })
}

pub fn handle(conn: &mut Connection, user: UserId, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required_arg(sub, "name")?;
            let account = create_account(conn, user, name)?;
            println!(
                "Added account '{}' {} ({})",
                account.name,
                account.classification.icon(),
                account.classification
            );
        }
        Some(("rename", sub)) => {
            let old = required_arg(sub, "old")?;
            let new = required_arg(sub, "new")?;
            let account = rename_account(conn, user, old, new)?;
            println!(
                "Renamed account '{}' -> '{}' ({})",
                old, account.name, account.classification
            );
        }
        Some(("rm", sub)) => {
            let name = required_arg(sub, "name")?;
            let removed = delete_account(conn, user, name)?;
            println!("Removed account '{}' and {} transactions", name, removed);
        }
        Some(("list", sub)) => {
            let accounts = list_accounts(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), &accounts)? {
                let data = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.classification.to_string(),
                            fmt_money(&a.balance),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Type", "Balance"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
