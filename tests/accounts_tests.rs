// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use daftar::commands::{accounts, transactions};
use daftar::db;
use daftar::error::{ErrorKind, LedgerError};
use daftar::models::Classification;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn classify_uses_name_keywords() {
    assert_eq!(accounts::classify("صندوق"), Classification::Asset);
    assert_eq!(accounts::classify("بنك_الأهلي"), Classification::Asset);
    assert_eq!(accounts::classify("عميل_أحمد"), Classification::ForUs);
    assert_eq!(accounts::classify("مورد_الخشب"), Classification::ForThem);
    assert_eq!(accounts::classify("إيجار"), Classification::Expense);
    assert_eq!(accounts::classify("مبيعات"), Classification::Revenue);
    assert_eq!(accounts::classify("سيارة"), Classification::General);
}

#[test]
fn classify_handles_multi_word_names() {
    assert_eq!(accounts::classify("صندوق المحل"), Classification::Asset);
    assert_eq!(accounts::classify("عميل أحمد"), Classification::ForUs);
    assert_eq!(accounts::classify("مصاريف الكهرباء"), Classification::Expense);
    assert_eq!(accounts::classify("شيء عشوائي"), Classification::General);
}

#[test]
fn classify_prefers_earlier_rules() {
    // Cash keyword beats the expense keyword later in the table.
    assert_eq!(accounts::classify("صندوق_الإيجار"), Classification::Asset);
}

#[test]
fn create_account_starts_at_zero() {
    let mut conn = setup();
    let acc = accounts::create_account(&mut conn, 1, "  صندوق  ").unwrap();
    assert_eq!(acc.name, "صندوق");
    assert_eq!(acc.balance, Decimal::ZERO);
    assert_eq!(acc.classification, Classification::Asset);

    let stored = accounts::get_account(&conn, 1, "صندوق").unwrap().unwrap();
    assert_eq!(stored, acc);
}

#[test]
fn account_cap_is_five_per_user() {
    let mut conn = setup();
    for name in ["a1", "a2", "a3", "a4", "a5"] {
        accounts::create_account(&mut conn, 1, name).unwrap();
    }
    let err = accounts::create_account(&mut conn, 1, "a6").unwrap_err();
    assert!(matches!(err, LedgerError::AccountLimit(5)));

    // Other users are unaffected.
    accounts::create_account(&mut conn, 2, "a6").unwrap();
    assert_eq!(accounts::list_accounts(&conn, 1).unwrap().len(), 5);
}

#[test]
fn rejects_bad_names() {
    let mut conn = setup();
    accounts::create_account(&mut conn, 1, "صندوق").unwrap();

    let dup = accounts::create_account(&mut conn, 1, "صندوق").unwrap_err();
    assert!(matches!(dup, LedgerError::DuplicateAccount(_)));
    assert_eq!(dup.kind(), ErrorKind::Validation);

    assert!(matches!(
        accounts::create_account(&mut conn, 1, "   ").unwrap_err(),
        LedgerError::EmptyAccountName
    ));
    assert!(matches!(
        accounts::create_account(&mut conn, 1, &"ب".repeat(51)).unwrap_err(),
        LedgerError::AccountNameTooLong(50)
    ));
    assert!(matches!(
        accounts::create_account(&mut conn, 1, "a/b").unwrap_err(),
        LedgerError::ForbiddenCharacters(_)
    ));
    // Fifty characters is still fine.
    accounts::create_account(&mut conn, 1, &"ب".repeat(50)).unwrap();
}

#[test]
fn rename_rewrites_transactions_and_reclassifies() {
    let mut conn = setup();
    accounts::create_account(&mut conn, 1, "صندوق").unwrap();
    accounts::create_account(&mut conn, 1, "أحمد").unwrap();
    let t = transactions::record_transfer(&mut conn, 1, "صندوق", "أحمد", "250", "").unwrap();

    let renamed = accounts::rename_account(&mut conn, 1, "أحمد", "عميل_أحمد").unwrap();
    assert_eq!(renamed.classification, Classification::ForUs);
    assert_eq!(renamed.balance, Decimal::from(250));

    let stored = transactions::get_by_id(&conn, 1, t.id).unwrap().unwrap();
    assert_eq!(stored.to_account.as_deref(), Some("عميل_أحمد"));
    assert!(accounts::get_account(&conn, 1, "أحمد").unwrap().is_none());
}

#[test]
fn rename_checks_both_names() {
    let mut conn = setup();
    accounts::create_account(&mut conn, 1, "صندوق").unwrap();
    accounts::create_account(&mut conn, 1, "بنك").unwrap();

    assert!(matches!(
        accounts::rename_account(&mut conn, 1, "مفقود", "جديد").unwrap_err(),
        LedgerError::AccountNotFound(_)
    ));
    assert!(matches!(
        accounts::rename_account(&mut conn, 1, "صندوق", "بنك").unwrap_err(),
        LedgerError::DuplicateAccount(_)
    ));
}

#[test]
fn delete_account_cascades_to_its_transactions() {
    let mut conn = setup();
    for name in ["صندوق", "بنك", "عميل"] {
        accounts::create_account(&mut conn, 1, name).unwrap();
    }
    transactions::record_cash_in(&mut conn, 1, "صندوق", "1000", "").unwrap();
    transactions::record_transfer(&mut conn, 1, "صندوق", "بنك", "400", "").unwrap();
    transactions::record_cash_in(&mut conn, 1, "عميل", "50", "").unwrap();

    let removed = accounts::delete_account(&mut conn, 1, "صندوق").unwrap();
    assert_eq!(removed, 2);

    let left = transactions::list_recent(&conn, 1, 10).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].to_account.as_deref(), Some("عميل"));
    // No reversal on cascade: the bank keeps the transferred funds.
    let bank = accounts::get_account(&conn, 1, "بنك").unwrap().unwrap();
    assert_eq!(bank.balance, Decimal::from(400));

    assert!(matches!(
        accounts::delete_account(&mut conn, 1, "صندوق").unwrap_err(),
        LedgerError::AccountNotFound(_)
    ));
}

#[test]
fn list_is_sorted_and_scoped_to_user() {
    let mut conn = setup();
    accounts::create_account(&mut conn, 1, "b").unwrap();
    accounts::create_account(&mut conn, 1, "a").unwrap();
    accounts::create_account(&mut conn, 2, "c").unwrap();

    let names: Vec<_> = accounts::list_accounts(&conn, 1)
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, ["a", "b"]);
}
