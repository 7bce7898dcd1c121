// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::LedgerError;

pub const MAX_ACCOUNT_NAME_CHARS: usize = 50;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static FORBIDDEN_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static regex"));

/// Rewrites Arabic-Indic (٠-٩) and Persian (۰-۹) digits as ASCII.
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// Parses a user-supplied amount. Only strictly positive decimals pass.
pub fn parse_amount(s: &str) -> Result<Decimal, LedgerError> {
    let raw = s.trim();
    let amount = normalize_digits(raw)
        .parse::<Decimal>()
        .map_err(|_| LedgerError::InvalidAmount(raw.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(raw.to_string()));
    }
    Ok(amount)
}

/// Returns the trimmed name when it is acceptable as an account name.
pub fn validate_account_name(name: &str) -> Result<&str, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyAccountName);
    }
    if trimmed.chars().count() > MAX_ACCOUNT_NAME_CHARS {
        return Err(LedgerError::AccountNameTooLong(MAX_ACCOUNT_NAME_CHARS));
    }
    if let Some(m) = FORBIDDEN_NAME_CHARS.find(trimmed) {
        return Err(LedgerError::ForbiddenCharacters(m.as_str().to_string()));
    }
    Ok(trimmed)
}

/// Decodes a decimal stored as TEXT.
pub fn decimal_from_db(column: &'static str, s: &str) -> Result<Decimal, LedgerError> {
    s.parse::<Decimal>().map_err(|_| LedgerError::Corrupt {
        column,
        value: s.to_string(),
    })
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::AmountOverflow)
}

/// Sum that reports overflow instead of panicking.
pub fn checked_sum<I>(values: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Balance with the counterparty wording used throughout the reports.
pub fn format_balance_status(balance: &Decimal) -> String {
    if *balance > Decimal::ZERO {
        format!("{} (لهم) 💚", fmt_money(balance))
    } else if *balance < Decimal::ZERO {
        format!("{} (لنا) 🔵", fmt_money(&balance.abs()))
    } else {
        format!("{} (متوازن) ⚖️", fmt_money(&Decimal::ZERO))
    }
}

pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn timestamp_to_db(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn timestamp_from_db(s: &str) -> Result<NaiveDateTime, LedgerError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| LedgerError::Corrupt {
            column: "transactions.created_at",
            value: s.to_string(),
        })
}

/// Short display form, minutes precision.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Midnight on the first day of the month containing `ts`.
pub fn month_start(ts: &NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(*ts)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

pub fn required_arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.as_str())
        .with_context(|| format!("missing argument '{}'", id))
}
