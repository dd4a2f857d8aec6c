// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io;
use tallybook::files::FileStore;
use tallybook::models::{
    AccountKind, CreditTerms, EntryKind, NewRefund, NewTransaction, TransactionChanges,
    TransactionFilter, TransactionKind,
};
use tallybook::{Ledger, LedgerError, db};

struct NoFiles;

impl FileStore for NoFiles {
    fn delete_stored_file(&self, _: &str) -> io::Result<()> {
        Ok(())
    }
}

const ALICE: i64 = 1;
const BOB: i64 = 2;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
}

fn card() -> AccountKind {
    AccountKind::Credit(CreditTerms {
        limit: d("5000"),
        billing_day: 20,
        due_day: 10,
    })
}

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn balance(ledger: &Ledger, id: i64) -> Decimal {
    ledger.get_account(ALICE, id).unwrap().balance
}

#[test]
fn income_and_expense_move_cash_balance() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Wallet", AccountKind::Cash, d("50"))
        .unwrap();

    ledger
        .create_income(ALICE, cash.id, d("1200.50"), None, day(1))
        .unwrap();
    ledger
        .create_expense(ALICE, cash.id, d("200.25"), None, day(2))
        .unwrap();

    assert_eq!(balance(&ledger, cash.id), d("1050.25"));
}

#[test]
fn non_positive_amounts_are_rejected() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Wallet", AccountKind::Cash, d("10"))
        .unwrap();

    for bad in ["0", "-5", "0.001"] {
        let err = ledger
            .create_expense(ALICE, cash.id, d(bad), None, day(1))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_AMOUNT", "amount {}", bad);
    }
    assert_eq!(balance(&ledger, cash.id), d("10"));
    assert!(
        ledger
            .list_transactions(ALICE, &TransactionFilter::default())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn amounts_are_rounded_to_cents() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Wallet", AccountKind::Cash, Decimal::ZERO)
        .unwrap();
    let tx = ledger
        .create_income(ALICE, cash.id, d("10.456"), None, day(1))
        .unwrap();
    assert_eq!(tx.amount, d("10.46"));
    assert_eq!(balance(&ledger, cash.id), d("10.46"));
}

#[test]
fn investment_accounts_only_take_transfers() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let bank = ledger
        .create_account(ALICE, "Bank", AccountKind::Bank, d("1000"))
        .unwrap();
    let fund = ledger
        .create_account(ALICE, "Index fund", AccountKind::Investment, Decimal::ZERO)
        .unwrap();

    let err = ledger
        .create_income(ALICE, fund.id, d("10"), None, day(1))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAccountType(id) if id == fund.id));
    let err = ledger
        .create_expense(ALICE, fund.id, d("10"), None, day(1))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ACCOUNT_TYPE");

    ledger
        .create_transfer(ALICE, bank.id, fund.id, d("300"), day(2))
        .unwrap();
    assert_eq!(balance(&ledger, bank.id), d("700"));
    assert_eq!(balance(&ledger, fund.id), d("300"));
}

#[test]
fn transfers_reject_credit_and_self() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let bank = ledger
        .create_account(ALICE, "Bank", AccountKind::Bank, d("1000"))
        .unwrap();
    let visa = ledger.create_account(ALICE, "Visa", card(), Decimal::ZERO).unwrap();

    let err = ledger
        .create_transfer(ALICE, bank.id, visa.id, d("10"), day(1))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ACCOUNT_TYPE");
    let err = ledger
        .create_transfer(ALICE, bank.id, bank.id, d("10"), day(1))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ACCOUNT_TYPE");
    assert_eq!(balance(&ledger, bank.id), d("1000"));
}

#[test]
fn credit_expense_leaves_balance_field_alone() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let visa = ledger.create_account(ALICE, "Visa", card(), Decimal::ZERO).unwrap();

    ledger
        .create_expense(ALICE, visa.id, d("3000"), None, day(3))
        .unwrap();

    assert_eq!(balance(&ledger, visa.id), Decimal::ZERO);
    assert_eq!(ledger.outstanding_balance(ALICE, visa.id).unwrap(), d("3000"));
    let err = ledger
        .create_income(ALICE, visa.id, d("5"), None, day(3))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ACCOUNT_TYPE");
}

#[test]
fn credit_terms_are_validated() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let bad = AccountKind::Credit(CreditTerms {
        limit: d("1000"),
        billing_day: 30,
        due_day: 5,
    });
    let err = ledger
        .create_account(ALICE, "Bad card", bad, Decimal::ZERO)
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_CREDIT_TERMS");
}

#[test]
fn change_account_conserves_money_for_every_type() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let a = ledger
        .create_account(ALICE, "A", AccountKind::Cash, d("1000"))
        .unwrap();
    let b = ledger
        .create_account(ALICE, "B", AccountKind::Bank, d("1000"))
        .unwrap();
    let c = ledger
        .create_account(ALICE, "C", AccountKind::Wechat, d("1000"))
        .unwrap();

    let income = ledger
        .create_income(ALICE, a.id, d("120"), None, day(1))
        .unwrap();
    let expense = ledger
        .create_expense(ALICE, a.id, d("80"), None, day(2))
        .unwrap();
    let refund = ledger
        .create_refund(
            ALICE,
            NewRefund {
                original_id: expense.id,
                amount: d("30"),
                date: day(3),
                note: None,
            },
        )
        .unwrap();
    let transfer = ledger
        .create_transfer(ALICE, a.id, c.id, d("50"), day(4))
        .unwrap();

    for id in [income.id, expense.id, refund.id, transfer.id] {
        let total_before = balance(&ledger, a.id) + balance(&ledger, b.id) + balance(&ledger, c.id);
        let change = ledger.change_account(ALICE, id, b.id).unwrap();
        assert_eq!(
            change.old_account_delta + change.new_account_delta,
            Decimal::ZERO,
            "transaction {}",
            id
        );
        assert!(!change.new_account_delta.is_zero());
        let total_after = balance(&ledger, a.id) + balance(&ledger, b.id) + balance(&ledger, c.id);
        assert_eq!(total_before, total_after);
    }

    // Everything that was on A now sits on B.
    assert_eq!(balance(&ledger, a.id), d("1000"));
    assert_eq!(balance(&ledger, b.id), d("1000") + d("120") - d("80") + d("30") - d("50"));
    assert_eq!(balance(&ledger, c.id), d("1050"));
}

#[test]
fn change_account_to_same_account_is_noop() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let a = ledger
        .create_account(ALICE, "A", AccountKind::Cash, d("100"))
        .unwrap();
    let tx = ledger
        .create_expense(ALICE, a.id, d("40"), None, day(1))
        .unwrap();

    let change = ledger.change_account(ALICE, tx.id, a.id).unwrap();
    assert_eq!(change.old_account_delta, Decimal::ZERO);
    assert_eq!(change.new_account_delta, Decimal::ZERO);
    assert_eq!(balance(&ledger, a.id), d("60"));
}

#[test]
fn change_account_skips_credit_endpoint() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Cash", AccountKind::Cash, d("500"))
        .unwrap();
    let visa = ledger.create_account(ALICE, "Visa", card(), Decimal::ZERO).unwrap();
    let tx = ledger
        .create_expense(ALICE, cash.id, d("200"), None, day(1))
        .unwrap();

    let change = ledger.change_account(ALICE, tx.id, visa.id).unwrap();
    assert_eq!(change.old_account_delta, d("200"));
    assert_eq!(change.new_account_delta, Decimal::ZERO);
    assert_eq!(balance(&ledger, cash.id), d("500"));
    assert_eq!(balance(&ledger, visa.id), Decimal::ZERO);
    assert_eq!(ledger.outstanding_balance(ALICE, visa.id).unwrap(), d("200"));

    let back = ledger.change_account(ALICE, tx.id, cash.id).unwrap();
    assert_eq!(back.old_account_delta, Decimal::ZERO);
    assert_eq!(back.new_account_delta, d("-200"));
    assert_eq!(ledger.outstanding_balance(ALICE, visa.id).unwrap(), Decimal::ZERO);
}

#[test]
fn change_account_respects_isolation() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Cash", AccountKind::Cash, d("500"))
        .unwrap();
    let fund = ledger
        .create_account(ALICE, "Fund", AccountKind::Investment, Decimal::ZERO)
        .unwrap();
    let tx = ledger
        .create_expense(ALICE, cash.id, d("20"), None, day(1))
        .unwrap();

    let err = ledger.change_account(ALICE, tx.id, fund.id).unwrap_err();
    assert_eq!(err.code(), "INVALID_ACCOUNT_TYPE");
    assert_eq!(balance(&ledger, cash.id), d("480"));
    assert_eq!(ledger.get_transaction(ALICE, tx.id).unwrap().account_id, cash.id);
}

#[test]
fn update_edits_amount_and_metadata() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Cash", AccountKind::Cash, d("500"))
        .unwrap();
    let food = ledger.create_category(ALICE, "Food").unwrap();
    let tx = ledger
        .create(
            ALICE,
            NewTransaction {
                kind: EntryKind::Expense,
                amount: d("100"),
                account_id: cash.id,
                category_id: None,
                date: day(1),
                note: Some("lunch".into()),
            },
        )
        .unwrap();

    let updated = ledger
        .update(
            ALICE,
            tx.id,
            TransactionChanges {
                amount: Some(d("75")),
                category_id: Some(Some(food.id)),
                date: Some(day(2)),
                note: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.amount, d("75"));
    assert_eq!(updated.category_id, Some(food.id));
    assert_eq!(updated.note, None);
    assert_eq!(balance(&ledger, cash.id), d("425"));
    assert_eq!(ledger.get_transaction(ALICE, tx.id).unwrap(), updated);
}

#[test]
fn expense_cannot_shrink_below_refunds() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(ALICE, "Cash", AccountKind::Cash, d("500"))
        .unwrap();
    let tx = ledger
        .create_expense(ALICE, cash.id, d("100"), None, day(1))
        .unwrap();
    ledger
        .create_refund(
            ALICE,
            NewRefund {
                original_id: tx.id,
                amount: d("60"),
                date: day(2),
                note: None,
            },
        )
        .unwrap();

    let err = ledger
        .update(
            ALICE,
            tx.id,
            TransactionChanges {
                amount: Some(d("50")),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "REFUND_AMOUNT_EXCEEDED");
    assert_eq!(balance(&ledger, cash.id), d("460"));
}

#[test]
fn users_cannot_touch_each_other() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let alice_cash = ledger
        .create_account(ALICE, "Cash", AccountKind::Cash, d("100"))
        .unwrap();
    let bob_cash = ledger
        .create_account(BOB, "Cash", AccountKind::Cash, d("100"))
        .unwrap();
    let tx = ledger
        .create_expense(ALICE, alice_cash.id, d("10"), None, day(1))
        .unwrap();

    let err = ledger.get_transaction(BOB, tx.id).unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden { entity: "transaction", .. }));
    assert_eq!(ledger.delete(BOB, tx.id).unwrap_err().code(), "FORBIDDEN");
    assert_eq!(
        ledger
            .create_expense(BOB, alice_cash.id, d("10"), None, day(1))
            .unwrap_err()
            .code(),
        "FORBIDDEN"
    );
    assert_eq!(
        ledger
            .change_account(ALICE, tx.id, bob_cash.id)
            .unwrap_err()
            .code(),
        "FORBIDDEN"
    );
    assert!(
        ledger
            .list_transactions(BOB, &TransactionFilter::default())
            .unwrap()
            .is_empty()
    );
    assert_eq!(ledger.list_accounts(BOB).unwrap().len(), 1);
    assert_eq!(ledger.get_account(BOB, bob_cash.id).unwrap().balance, d("100"));
    assert_eq!(balance(&ledger, alice_cash.id), d("90"));
}

#[test]
fn missing_entities_are_not_found() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    assert_eq!(ledger.get_transaction(ALICE, 99).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(
        ledger
            .create_expense(ALICE, 42, d("1"), None, day(1))
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );
}

#[test]
fn list_filters_by_month_and_account() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let a = ledger
        .create_account(ALICE, "A", AccountKind::Cash, d("100"))
        .unwrap();
    let b = ledger
        .create_account(ALICE, "B", AccountKind::Cash, d("100"))
        .unwrap();
    ledger.create_expense(ALICE, a.id, d("1"), None, day(1)).unwrap();
    ledger.create_expense(ALICE, b.id, d("2"), None, day(2)).unwrap();
    ledger
        .create_expense(
            ALICE,
            a.id,
            d("3"),
            None,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        )
        .unwrap();
    let t = ledger.create_transfer(ALICE, b.id, a.id, d("4"), day(5)).unwrap();

    let march_a = ledger
        .list_transactions(
            ALICE,
            &TransactionFilter {
                month: Some("2025-03".into()),
                account_id: Some(a.id),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(march_a.len(), 2);
    assert_eq!(march_a[0].id, t.id);
    assert!(matches!(march_a[0].kind, TransactionKind::Transfer { to_account_id } if to_account_id == a.id));
}
