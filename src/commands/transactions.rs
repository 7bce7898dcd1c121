// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::accounts::account_exists;
use crate::error::{LedgerError, Result};
use crate::models::{
    AccountRole, EditField, Intent, Transaction, TransactionDraft, TransactionKind, UserId,
};
use crate::parser;
use crate::utils::{
    checked_add, decimal_from_db, fmt_money, format_timestamp, maybe_print_json, now_timestamp,
    parse_amount, pretty_table, required_arg, timestamp_from_db, timestamp_to_db,
};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;

/// Upper bound (and default) for history listings.
pub const MAX_HISTORY: usize = 10;

const SELECT_COLUMNS: &str = "SELECT id, user_id, transaction_type, from_account, to_account, amount, description, created_at FROM transactions";

pub fn record_cash_in(
    conn: &mut Connection,
    user: UserId,
    to_account: &str,
    amount_text: &str,
    memo: &str,
) -> Result<Transaction> {
    record(conn, user, TransactionKind::CashIn, None, Some(to_account), amount_text, memo)
}

pub fn record_cash_out(
    conn: &mut Connection,
    user: UserId,
    from_account: &str,
    amount_text: &str,
    memo: &str,
) -> Result<Transaction> {
    record(conn, user, TransactionKind::CashOut, Some(from_account), None, amount_text, memo)
}

pub fn record_transfer(
    conn: &mut Connection,
    user: UserId,
    from_account: &str,
    to_account: &str,
    amount_text: &str,
    memo: &str,
) -> Result<Transaction> {
    record(
        conn,
        user,
        TransactionKind::Transfer,
        Some(from_account),
        Some(to_account),
        amount_text,
        memo,
    )
}

/// Records whatever the parser made of a chat message.
pub fn record_intent(conn: &mut Connection, user: UserId, intent: &Intent) -> Result<Transaction> {
    let amount = intent.amount.as_deref().ok_or(LedgerError::MissingAmount)?;
    let from = intent.from_account.as_deref();
    let to = intent.to_account.as_deref();
    match intent.kind {
        TransactionKind::CashIn => {
            let to = to.ok_or(LedgerError::MissingAccount(AccountRole::Destination))?;
            record_cash_in(conn, user, to, amount, &intent.memo)
        }
        TransactionKind::CashOut => {
            let from = from.ok_or(LedgerError::MissingAccount(AccountRole::Source))?;
            record_cash_out(conn, user, from, amount, &intent.memo)
        }
        TransactionKind::Transfer => {
            let from = from.ok_or(LedgerError::MissingAccount(AccountRole::Source))?;
            let to = to.ok_or(LedgerError::MissingAccount(AccountRole::Destination))?;
            record_transfer(conn, user, from, to, amount, &intent.memo)
        }
    }
}

fn record(
    conn: &mut Connection,
    user: UserId,
    kind: TransactionKind,
    from: Option<&str>,
    to: Option<&str>,
    amount_text: &str,
    memo: &str,
) -> Result<Transaction> {
    let amount = parse_amount(amount_text)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let (from, to) = check_shape(&tx, user, kind, from, to)?;

    let created_at = now_timestamp();
    tx.execute(
        "INSERT INTO transactions(user_id, transaction_type, from_account, to_account, amount, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user,
            kind.as_str(),
            from,
            to,
            amount.to_string(),
            memo.trim(),
            timestamp_to_db(&created_at)
        ],
    )?;
    let t = Transaction {
        id: tx.last_insert_rowid(),
        user_id: user,
        kind,
        from_account: from,
        to_account: to,
        amount,
        memo: memo.trim().to_string(),
        created_at,
    };
    apply_effect(&tx, &t, Decimal::ONE)?;
    tx.commit()?;
    log::info!("user {} recorded {} #{} for {}", user, t.kind, t.id, amount);
    Ok(t)
}

/// Replaces every field of a stored transaction. The old balance effect is
/// undone and the new one applied inside a single store transaction, so a
/// failure at any step leaves balances as they were.
pub fn edit_transaction(
    conn: &mut Connection,
    user: UserId,
    id: i64,
    draft: &TransactionDraft,
) -> Result<Transaction> {
    let amount = parse_amount(&draft.amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_by_id(&tx, user, id)?.ok_or(LedgerError::TransactionNotFound(id))?;
    apply_effect(&tx, &old, Decimal::NEGATIVE_ONE)?;

    let (from, to) = check_shape(
        &tx,
        user,
        draft.kind,
        draft.from_account.as_deref(),
        draft.to_account.as_deref(),
    )?;
    let memo = draft.memo.trim().to_string();
    tx.execute(
        "UPDATE transactions
         SET transaction_type=?1, from_account=?2, to_account=?3, amount=?4, description=?5
         WHERE user_id=?6 AND id=?7",
        params![draft.kind.as_str(), from, to, amount.to_string(), memo, user, id],
    )?;
    let updated = Transaction {
        id,
        user_id: user,
        kind: draft.kind,
        from_account: from,
        to_account: to,
        amount,
        memo,
        created_at: old.created_at,
    };
    apply_effect(&tx, &updated, Decimal::ONE)?;
    tx.commit()?;
    log::info!("user {} edited transaction #{}", user, id);
    Ok(updated)
}

/// Changes one field and leaves the rest as stored.
pub fn apply_field_edit(
    conn: &mut Connection,
    user: UserId,
    id: i64,
    field: EditField,
) -> Result<Transaction> {
    let current = get_by_id(conn, user, id)?.ok_or(LedgerError::TransactionNotFound(id))?;
    let mut draft = TransactionDraft::from(&current);
    match field {
        // The single named account moves to the side the new kind uses.
        EditField::Kind(kind) => {
            match kind {
                TransactionKind::CashIn if draft.to_account.is_none() => {
                    draft.to_account = draft.from_account.take();
                }
                TransactionKind::CashOut if draft.from_account.is_none() => {
                    draft.from_account = draft.to_account.take();
                }
                _ => {}
            }
            draft.kind = kind;
        }
        EditField::FromAccount(name) => draft.from_account = Some(name),
        EditField::ToAccount(name) => draft.to_account = Some(name),
        EditField::Amount(text) => draft.amount = text,
        EditField::Memo(memo) => draft.memo = memo,
    }
    edit_transaction(conn, user, id, &draft)
}

/// Removes a transaction after undoing its balance effect. Returns the removed row.
pub fn delete_transaction(conn: &mut Connection, user: UserId, id: i64) -> Result<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_by_id(&tx, user, id)?.ok_or(LedgerError::TransactionNotFound(id))?;
    apply_effect(&tx, &old, Decimal::NEGATIVE_ONE)?;
    tx.execute(
        "DELETE FROM transactions WHERE user_id=?1 AND id=?2",
        params![user, id],
    )?;
    tx.commit()?;
    log::info!("user {} deleted transaction #{}", user, id);
    Ok(old)
}

pub fn get_by_id(conn: &Connection, user: UserId, id: i64) -> Result<Option<Transaction>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE user_id=?1 AND id=?2"),
            params![user, id],
            raw_transaction,
        )
        .optional()?;
    raw.map(into_transaction).transpose()
}

/// Newest first. `limit` is clamped to `1..=MAX_HISTORY`.
pub fn list_recent(conn: &Connection, user: UserId, limit: usize) -> Result<Vec<Transaction>> {
    let limit = limit.clamp(1, MAX_HISTORY) as i64;
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE user_id=?1 ORDER BY created_at DESC, id DESC LIMIT ?2"),
        params![user, limit],
    )
}

/// Newest first, either side of the transaction.
pub fn list_for_account(
    conn: &Connection,
    user: UserId,
    account: &str,
    limit: usize,
) -> Result<Vec<Transaction>> {
    query(
        conn,
        &format!(
            "{SELECT_COLUMNS} WHERE user_id=?1 AND (from_account=?2 OR to_account=?2)
             ORDER BY created_at DESC, id DESC LIMIT ?3"
        ),
        params![user, account, limit as i64],
    )
}

/// Newest first, created at or after `since`.
pub fn list_since(conn: &Connection, user: UserId, since: &NaiveDateTime) -> Result<Vec<Transaction>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE user_id=?1 AND created_at>=?2 ORDER BY created_at DESC, id DESC"),
        params![user, timestamp_to_db(since)],
    )
}

pub fn list_all(conn: &Connection, user: UserId) -> Result<Vec<Transaction>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE user_id=?1 ORDER BY created_at, id"),
        params![user],
    )
}

fn query(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, raw_transaction)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_transaction(row?)?);
    }
    Ok(out)
}

/// Signed balance changes a transaction causes, per account name.
pub fn balance_effects(t: &Transaction) -> Vec<(&str, Decimal)> {
    let mut out = Vec::with_capacity(2);
    match t.kind {
        TransactionKind::CashIn => {
            if let Some(to) = t.to_account.as_deref() {
                out.push((to, t.amount));
            }
        }
        TransactionKind::CashOut => {
            if let Some(from) = t.from_account.as_deref() {
                out.push((from, -t.amount));
            }
        }
        TransactionKind::Transfer => {
            if let Some(from) = t.from_account.as_deref() {
                out.push((from, -t.amount));
            }
            if let Some(to) = t.to_account.as_deref() {
                out.push((to, t.amount));
            }
        }
    }
    out
}

// `sign` is ONE to apply and NEGATIVE_ONE to reverse.
fn apply_effect(conn: &Connection, t: &Transaction, sign: Decimal) -> Result<()> {
    for (account, delta) in balance_effects(t) {
        adjust_balance(conn, t.user_id, account, delta * sign)?;
    }
    Ok(())
}

fn adjust_balance(conn: &Connection, user: UserId, account: &str, delta: Decimal) -> Result<()> {
    let current: Option<String> = conn
        .query_row(
            "SELECT balance FROM accounts WHERE user_id=?1 AND name=?2",
            params![user, account],
            |r| r.get(0),
        )
        .optional()?;
    let current = current.ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;
    let next = checked_add(decimal_from_db("accounts.balance", &current)?, delta)?;
    conn.execute(
        "UPDATE accounts SET balance=?1 WHERE user_id=?2 AND name=?3",
        params![next.to_string(), user, account],
    )?;
    Ok(())
}

/// Enforces the account shape of `kind` and returns the normalized pair.
fn check_shape(
    conn: &Connection,
    user: UserId,
    kind: TransactionKind,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<String>, Option<String>)> {
    let require = |name: Option<&str>, role: AccountRole| -> Result<String> {
        let name = name.ok_or(LedgerError::MissingAccount(role))?;
        if !account_exists(conn, user, name)? {
            return Err(LedgerError::AccountNotFound(name.to_string()));
        }
        Ok(name.to_string())
    };
    match kind {
        TransactionKind::CashIn => Ok((None, Some(require(to, AccountRole::Destination)?))),
        TransactionKind::CashOut => Ok((Some(require(from, AccountRole::Source)?), None)),
        TransactionKind::Transfer => {
            let from = require(from, AccountRole::Source)?;
            let to = require(to, AccountRole::Destination)?;
            if from == to {
                return Err(LedgerError::SameAccount);
            }
            Ok((Some(from), Some(to)))
        }
    }
}

type RawTransaction = (
    i64,
    i64,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    String,
);

fn raw_transaction(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn into_transaction(raw: RawTransaction) -> Result<Transaction> {
    let (id, user_id, kind, from_account, to_account, amount, memo, created_at) = raw;
    let kind = kind
        .parse::<TransactionKind>()
        .map_err(|_| LedgerError::Corrupt {
            column: "transactions.transaction_type",
            value: kind.clone(),
        })?;
    Ok(Transaction {
        id,
        user_id,
        kind,
        from_account,
        to_account,
        amount: decimal_from_db("transactions.amount", &amount)?,
        memo: memo.unwrap_or_default(),
        created_at: timestamp_from_db(&created_at)?,
    })
}

pub fn handle(conn: &mut Connection, user: UserId, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let text = required_arg(sub, "text")?;
            let t = record_intent(conn, user, &parser::parse(text))?;
            println!(
                "Recorded {} #{} {} ({})",
                t.kind,
                t.id,
                fmt_money(&t.amount),
                describe_accounts(&t)
            );
        }
        Some(("edit", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("missing argument 'id'"))?;
            let current = get_by_id(conn, user, id)?.ok_or(LedgerError::TransactionNotFound(id))?;
            let mut draft = TransactionDraft::from(&current);
            if let Some(kind) = sub.get_one::<String>("kind") {
                draft.kind = kind.parse()?;
            }
            if let Some(from) = sub.get_one::<String>("from") {
                draft.from_account = Some(from.trim_start_matches('@').to_string());
            }
            if let Some(to) = sub.get_one::<String>("to") {
                draft.to_account = Some(to.trim_start_matches('@').to_string());
            }
            if let Some(amount) = sub.get_one::<String>("amount") {
                draft.amount = amount.clone();
            }
            if let Some(memo) = sub.get_one::<String>("memo") {
                draft.memo = memo.clone();
            }
            let t = edit_transaction(conn, user, id, &draft)?;
            println!("Updated #{} -> {} {}", t.id, t.kind, fmt_money(&t.amount));
        }
        Some(("rm", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("missing argument 'id'"))?;
            let t = delete_transaction(conn, user, id)?;
            println!("Removed #{} ({} {})", t.id, t.kind, fmt_money(&t.amount));
        }
        Some(("show", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("missing argument 'id'"))?;
            let t = get_by_id(conn, user, id)?.ok_or(LedgerError::TransactionNotFound(id))?;
            if !maybe_print_json(sub.get_flag("json"), &t)? {
                println!("{}", crate::commands::reports::transaction_details(&t));
            }
        }
        Some(("list", sub)) => {
            let limit = sub.get_one::<usize>("limit").copied().unwrap_or(MAX_HISTORY);
            let data = list_recent(conn, user, limit)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            format_timestamp(&t.created_at),
                            t.kind.to_string(),
                            t.from_account.clone().unwrap_or_default(),
                            t.to_account.clone().unwrap_or_default(),
                            fmt_money(&t.amount),
                            t.memo.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Date", "Kind", "From", "To", "Amount", "Memo"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn describe_accounts(t: &Transaction) -> String {
    match (t.from_account.as_deref(), t.to_account.as_deref()) {
        (Some(from), Some(to)) => format!("{from} -> {to}"),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("to {to}"),
        (None, None) => String::new(),
    }
}
