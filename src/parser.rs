// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keyword parser for free-form transaction text such as
//! `من @صندوق إلى @بنك 1000 إيجار`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Intent, TransactionKind};
use crate::utils::normalize_digits;

pub const CASH_IN_KEYWORDS: &[&str] = &["دخول", "إيداع", "وصل", "تحصيل", "قبض"];
pub const CASH_OUT_KEYWORDS: &[&str] = &["خروج", "سحب", "دفع", "صرف", "سداد"];
pub const TRANSFER_KEYWORDS: &[&str] = &["تحويل", "نقل", "من", "إلى", "ل"];

const FROM_WORDS: &[&str] = &["من"];
const TO_WORDS: &[&str] = &["إلى", "ل"];

// Checked in order; the first table with a hit decides the kind.
const KIND_RULES: &[(&[&str], TransactionKind)] = &[
    (CASH_IN_KEYWORDS, TransactionKind::CashIn),
    (CASH_OUT_KEYWORDS, TransactionKind::CashOut),
];

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("static regex"));
static MENTION_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(\w+)").expect("static regex"));
// ASCII, Arabic-Indic and Persian digits.
static AMOUNT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9٠-٩۰-۹]+(?:\.[0-9٠-٩۰-۹]+)?)").expect("static regex")
});

pub fn parse(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mentioned_accounts = extract_mentions(text);
    let amount = tokens
        .iter()
        .filter(|t| !t.starts_with('@'))
        .find_map(|t| amount_prefix(t))
        .map(normalize_digits);
    let kind = detect_kind(&lowered);

    let mut from_account = None;
    let mut to_account = None;
    match kind {
        TransactionKind::CashIn => {
            to_account = mention_after(&tokens, TO_WORDS)
                .or_else(|| mentioned_accounts.first().cloned());
        }
        TransactionKind::CashOut => {
            from_account = mention_after(&tokens, FROM_WORDS)
                .or_else(|| mentioned_accounts.first().cloned());
        }
        TransactionKind::Transfer => match mentioned_accounts.as_slice() {
            [first, second, ..] => {
                from_account = Some(first.clone());
                to_account = Some(second.clone());
            }
            [only] => {
                if has_token(&tokens, FROM_WORDS) {
                    from_account = Some(only.clone());
                } else if has_token(&tokens, TO_WORDS) {
                    to_account = Some(only.clone());
                }
            }
            [] => {}
        },
    }

    let memo = tokens
        .iter()
        .filter(|t| !t.starts_with('@'))
        .filter(|t| amount_prefix(t).is_none())
        .filter(|t| !is_keyword(&t.to_lowercase()))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let intent = Intent {
        kind,
        from_account,
        to_account,
        amount,
        memo,
        mentioned_accounts,
    };
    log::debug!("parsed {:?} -> {:?}", text, intent);
    intent
}

pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

pub fn detect_kind(lowered: &str) -> TransactionKind {
    KIND_RULES
        .iter()
        .find(|(words, _)| words.iter().any(|w| lowered.contains(w)))
        .map(|(_, kind)| *kind)
        .unwrap_or(TransactionKind::Transfer)
}

fn amount_prefix(token: &str) -> Option<&str> {
    AMOUNT_PREFIX
        .captures(token)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Account named by the `@name` token directly after one of `words`.
fn mention_after(tokens: &[&str], words: &[&str]) -> Option<String> {
    tokens.windows(2).find_map(|pair| {
        if !words.contains(&pair[0].to_lowercase().as_str()) {
            return None;
        }
        MENTION_TOKEN
            .captures(pair[1])
            .map(|c| c[1].to_string())
    })
}

fn has_token(tokens: &[&str], words: &[&str]) -> bool {
    tokens
        .iter()
        .any(|t| words.contains(&t.to_lowercase().as_str()))
}

fn is_keyword(token: &str) -> bool {
    CASH_IN_KEYWORDS
        .iter()
        .chain(CASH_OUT_KEYWORDS)
        .chain(TRANSFER_KEYWORDS)
        .any(|k| *k == token)
}
