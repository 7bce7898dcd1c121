// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use daftar::models::TransactionKind;
use daftar::parser::{detect_kind, extract_mentions, parse};

#[test]
fn transfer_between_two_mentions() {
    let intent = parse("من @صندوق إلى @بنك 1000");
    assert_eq!(intent.kind, TransactionKind::Transfer);
    assert_eq!(intent.from_account.as_deref(), Some("صندوق"));
    assert_eq!(intent.to_account.as_deref(), Some("بنك"));
    assert_eq!(intent.amount.as_deref(), Some("1000"));
    assert_eq!(intent.memo, "");
    assert_eq!(intent.mentioned_accounts, ["صندوق", "بنك"]);
}

#[test]
fn cash_in_with_memo() {
    let intent = parse("دخول إلى @صندوق 500 من العميل");
    assert_eq!(intent.kind, TransactionKind::CashIn);
    assert_eq!(intent.to_account.as_deref(), Some("صندوق"));
    assert_eq!(intent.from_account, None);
    assert_eq!(intent.amount.as_deref(), Some("500"));
    assert_eq!(intent.memo, "العميل");
}

#[test]
fn cash_out_with_memo() {
    let intent = parse("خروج من @بنك 300 مصاريف");
    assert_eq!(intent.kind, TransactionKind::CashOut);
    assert_eq!(intent.from_account.as_deref(), Some("بنك"));
    assert_eq!(intent.to_account, None);
    assert_eq!(intent.amount.as_deref(), Some("300"));
    assert_eq!(intent.memo, "مصاريف");
}

#[test]
fn cash_in_falls_back_to_first_mention() {
    let intent = parse("إيداع @محفظة 20.5");
    assert_eq!(intent.kind, TransactionKind::CashIn);
    assert_eq!(intent.to_account.as_deref(), Some("محفظة"));
    assert_eq!(intent.amount.as_deref(), Some("20.5"));
}

#[test]
fn cash_in_keywords_win_over_cash_out() {
    assert_eq!(detect_kind("دخول ثم سحب"), TransactionKind::CashIn);
    assert_eq!(detect_kind("سداد فاتورة"), TransactionKind::CashOut);
    assert_eq!(detect_kind("شيء آخر"), TransactionKind::Transfer);
}

#[test]
fn single_mention_transfer_uses_direction_word() {
    let from = parse("من @صندوق 100");
    assert_eq!(from.from_account.as_deref(), Some("صندوق"));
    assert_eq!(from.to_account, None);

    let to = parse("إلى @بنك 100");
    assert_eq!(to.from_account, None);
    assert_eq!(to.to_account.as_deref(), Some("بنك"));

    let neither = parse("@بنك 100");
    assert_eq!(neither.from_account, None);
    assert_eq!(neither.to_account, None);
}

#[test]
fn amount_takes_numeric_prefix_of_first_number_token() {
    let intent = parse("من @صندوق إلى @بنك 250ريال ثم 300");
    assert_eq!(intent.amount.as_deref(), Some("250"));
    assert_eq!(intent.memo, "ثم");
}

#[test]
fn arabic_indic_digits_are_amounts() {
    let intent = parse("دخول إلى @صندوق ٥٠٠");
    assert_eq!(intent.kind, TransactionKind::CashIn);
    assert_eq!(intent.to_account.as_deref(), Some("صندوق"));
    assert_eq!(intent.amount.as_deref(), Some("500"));
    assert_eq!(intent.memo, "");

    let persian = parse("من @صندوق إلى @بنك ۱۲.۵ أجرة");
    assert_eq!(persian.amount.as_deref(), Some("12.5"));
    assert_eq!(persian.memo, "أجرة");
}

#[test]
fn missing_amount_and_mentions() {
    let intent = parse("تحويل بدون تفاصيل");
    assert_eq!(intent.kind, TransactionKind::Transfer);
    assert_eq!(intent.amount, None);
    assert_eq!(intent.from_account, None);
    assert_eq!(intent.to_account, None);
    assert!(extract_mentions("بدون حسابات").is_empty());
    assert_eq!(intent.memo, "بدون تفاصيل");
}
