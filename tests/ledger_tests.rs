// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use daftar::commands::{accounts, transactions};
use daftar::db;
use daftar::error::{ErrorKind, LedgerError};
use daftar::models::{AccountRole, EditField, TransactionDraft, TransactionKind};
use daftar::parser;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    for name in ["صندوق", "بنك"] {
        accounts::create_account(&mut conn, 1, name).unwrap();
    }
    conn
}

fn balance(conn: &Connection, name: &str) -> Decimal {
    accounts::get_account(conn, 1, name).unwrap().unwrap().balance
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn end_to_end_scenario() {
    let mut conn = setup();
    let cash_in =
        transactions::record_intent(&mut conn, 1, &parser::parse("دخول إلى @صندوق 5000")).unwrap();
    assert_eq!(cash_in.kind, TransactionKind::CashIn);
    assert_eq!(balance(&conn, "صندوق"), dec("5000"));

    let transfer =
        transactions::record_intent(&mut conn, 1, &parser::parse("من @صندوق إلى @بنك 2000"))
            .unwrap();
    assert_eq!(transfer.kind, TransactionKind::Transfer);
    assert_eq!(balance(&conn, "صندوق"), dec("3000"));
    assert_eq!(balance(&conn, "بنك"), dec("2000"));

    let edited = transactions::apply_field_edit(
        &mut conn,
        1,
        transfer.id,
        EditField::Amount("500".into()),
    )
    .unwrap();
    assert_eq!(edited.amount, dec("500"));
    assert_eq!(balance(&conn, "صندوق"), dec("4500"));
    assert_eq!(balance(&conn, "بنك"), dec("500"));

    let removed = transactions::delete_transaction(&mut conn, 1, cash_in.id).unwrap();
    assert_eq!(removed.id, cash_in.id);
    assert_eq!(balance(&conn, "صندوق"), dec("-500"));
    assert_eq!(balance(&conn, "بنك"), dec("500"));
}

#[test]
fn balances_match_live_transactions() {
    let mut conn = setup();
    accounts::create_account(&mut conn, 1, "مورد").unwrap();
    transactions::record_cash_in(&mut conn, 1, "صندوق", "1200.50", "").unwrap();
    let t = transactions::record_transfer(&mut conn, 1, "صندوق", "بنك", "300.25", "").unwrap();
    transactions::record_cash_out(&mut conn, 1, "بنك", "100", "رسوم").unwrap();
    transactions::record_transfer(&mut conn, 1, "بنك", "مورد", "75", "").unwrap();
    let gone = transactions::record_cash_in(&mut conn, 1, "مورد", "10", "").unwrap();
    transactions::edit_transaction(
        &mut conn,
        1,
        t.id,
        &TransactionDraft {
            kind: TransactionKind::Transfer,
            from_account: Some("بنك".into()),
            to_account: Some("صندوق".into()),
            amount: "40".into(),
            memo: "عكس".into(),
        },
    )
    .unwrap();
    transactions::delete_transaction(&mut conn, 1, gone.id).unwrap();

    let mut expected: HashMap<String, Decimal> = HashMap::new();
    for t in transactions::list_all(&conn, 1).unwrap() {
        for (name, delta) in transactions::balance_effects(&t) {
            *expected.entry(name.to_string()).or_default() += delta;
        }
    }
    for acc in accounts::list_accounts(&conn, 1).unwrap() {
        let want = expected.get(&acc.name).copied().unwrap_or_default();
        assert_eq!(acc.balance, want, "account {}", acc.name);
    }
}

#[test]
fn editing_to_the_same_values_changes_nothing() {
    let mut conn = setup();
    let t = transactions::record_transfer(&mut conn, 1, "صندوق", "بنك", "120.75", "أجرة").unwrap();
    let before = (balance(&conn, "صندوق"), balance(&conn, "بنك"));

    let draft = TransactionDraft::from(&t);
    let again = transactions::edit_transaction(&mut conn, 1, t.id, &draft).unwrap();

    assert_eq!(again, t);
    assert_eq!((balance(&conn, "صندوق"), balance(&conn, "بنك")), before);
    assert_eq!(transactions::get_by_id(&conn, 1, t.id).unwrap().unwrap(), t);
}

#[test]
fn recreated_transaction_gets_a_new_id() {
    let mut conn = setup();
    let first = transactions::record_cash_in(&mut conn, 1, "صندوق", "10", "").unwrap();
    transactions::delete_transaction(&mut conn, 1, first.id).unwrap();
    let second = transactions::record_cash_in(&mut conn, 1, "صندوق", "10", "").unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(balance(&conn, "صندوق"), dec("10"));
    assert!(transactions::get_by_id(&conn, 1, first.id).unwrap().is_none());
}

#[test]
fn failed_edit_rolls_back_the_reversal() {
    let mut conn = setup();
    let t = transactions::record_transfer(&mut conn, 1, "صندوق", "بنك", "900", "").unwrap();

    let err = transactions::apply_field_edit(
        &mut conn,
        1,
        t.id,
        EditField::ToAccount("غير_موجود".into()),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(_)));

    let err = transactions::apply_field_edit(&mut conn, 1, t.id, EditField::Amount("-3".into()))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    assert_eq!(balance(&conn, "صندوق"), dec("-900"));
    assert_eq!(balance(&conn, "بنك"), dec("900"));
    assert_eq!(transactions::get_by_id(&conn, 1, t.id).unwrap().unwrap(), t);
}

#[test]
fn transfer_to_itself_is_rejected() {
    let mut conn = setup();
    let err = transactions::record_transfer(&mut conn, 1, "بنك", "بنك", "5", "").unwrap_err();
    assert!(matches!(err, LedgerError::SameAccount));
    assert_eq!(err.kind(), ErrorKind::SameAccount);
    assert!(transactions::list_recent(&conn, 1, 10).unwrap().is_empty());
}

#[test]
fn amounts_must_be_positive_decimals() {
    let mut conn = setup();
    for bad in ["0", "-5", "abc", ""] {
        let err = transactions::record_cash_in(&mut conn, 1, "صندوق", bad, "").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)), "{bad:?}");
    }
    assert_eq!(balance(&conn, "صندوق"), Decimal::ZERO);
}

#[test]
fn arabic_indic_amounts_are_accepted() {
    let mut conn = setup();
    let t = transactions::record_cash_in(&mut conn, 1, "صندوق", "٢٥٠.٥", "").unwrap();
    assert_eq!(t.amount, dec("250.5"));
    transactions::record_intent(&mut conn, 1, &parser::parse("خروج من @صندوق ٥٠")).unwrap();
    assert_eq!(balance(&conn, "صندوق"), dec("200.5"));
}

#[test]
fn balance_overflow_is_rejected_and_rolled_back() {
    let mut conn = setup();
    let max = Decimal::MAX.to_string();
    transactions::record_cash_in(&mut conn, 1, "صندوق", &max, "").unwrap();

    let err = transactions::record_cash_in(&mut conn, 1, "صندوق", &max, "").unwrap_err();
    assert!(matches!(err, LedgerError::AmountOverflow));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(balance(&conn, "صندوق"), Decimal::MAX);
    assert_eq!(transactions::list_recent(&conn, 1, 10).unwrap().len(), 1);

    // Pushing the other way past the minimum fails too.
    transactions::record_cash_out(&mut conn, 1, "بنك", &max, "").unwrap();
    let err = transactions::record_transfer(&mut conn, 1, "بنك", "صندوق", "1", "").unwrap_err();
    assert!(matches!(err, LedgerError::AmountOverflow));
    assert_eq!(balance(&conn, "بنك"), Decimal::MIN);
    assert_eq!(balance(&conn, "صندوق"), Decimal::MAX);
}

#[test]
fn unknown_accounts_and_ids() {
    let mut conn = setup();
    assert!(matches!(
        transactions::record_cash_out(&mut conn, 1, "مفقود", "5", "").unwrap_err(),
        LedgerError::AccountNotFound(_)
    ));
    assert!(matches!(
        transactions::delete_transaction(&mut conn, 1, 99).unwrap_err(),
        LedgerError::TransactionNotFound(99)
    ));
    // Another user's transaction is invisible.
    let t = transactions::record_cash_in(&mut conn, 1, "صندوق", "5", "").unwrap();
    assert!(transactions::get_by_id(&conn, 2, t.id).unwrap().is_none());
}

#[test]
fn intent_needs_amount_and_accounts() {
    let mut conn = setup();
    let err = transactions::record_intent(&mut conn, 1, &parser::parse("دخول إلى @صندوق"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::MissingAmount));

    let err = transactions::record_intent(&mut conn, 1, &parser::parse("من @صندوق 100"))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::MissingAccount(AccountRole::Destination)
    ));
}

#[test]
fn changing_kind_moves_the_account() {
    let mut conn = setup();
    let t = transactions::record_cash_in(&mut conn, 1, "صندوق", "100", "").unwrap();

    let out = transactions::apply_field_edit(
        &mut conn,
        1,
        t.id,
        EditField::Kind(TransactionKind::CashOut),
    )
    .unwrap();
    assert_eq!(out.from_account.as_deref(), Some("صندوق"));
    assert_eq!(out.to_account, None);
    assert_eq!(balance(&conn, "صندوق"), dec("-100"));

    // A transfer needs both sides; the edit fails and nothing moves.
    let err = transactions::apply_field_edit(
        &mut conn,
        1,
        t.id,
        EditField::Kind(TransactionKind::Transfer),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::MissingAccount(AccountRole::Destination)
    ));
    assert_eq!(balance(&conn, "صندوق"), dec("-100"));
}

#[test]
fn list_recent_is_newest_first_and_clamped() {
    let mut conn = setup();
    let mut ids = Vec::new();
    for i in 1..=12 {
        let t = transactions::record_cash_in(&mut conn, 1, "صندوق", &i.to_string(), "").unwrap();
        ids.push(t.id);
    }

    let rows = transactions::list_recent(&conn, 1, 50).unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].id, *ids.last().unwrap());
    assert!(rows.windows(2).all(|w| w[0].id > w[1].id));

    assert_eq!(transactions::list_recent(&conn, 1, 0).unwrap().len(), 1);
    assert_eq!(transactions::list_recent(&conn, 1, 3).unwrap().len(), 3);
}
