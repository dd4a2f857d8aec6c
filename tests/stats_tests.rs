// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io;
use tallybook::files::FileStore;
use tallybook::models::{AccountKind, CreditTerms, NewRefund, NewRepayment};
use tallybook::{Ledger, db};

struct NoFiles;

impl FileStore for NoFiles {
    fn delete_stored_file(&self, _: &str) -> io::Result<()> {
        Ok(())
    }
}

const USER: i64 = 1;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn refunds_from_earlier_months_can_push_net_expense_negative() {
    let mut conn = db::open_in_memory().unwrap();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let cash = ledger
        .create_account(USER, "Cash", AccountKind::Cash, d("1000"))
        .unwrap();
    let gear = ledger.create_category(USER, "Gear").unwrap();
    let food = ledger.create_category(USER, "Food").unwrap();

    let jan = NaiveDate::from_ymd_opt(2025, 1, 28).unwrap();
    let feb = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
    let tent = ledger
        .create_expense(USER, cash.id, d("300"), Some(gear.id), jan)
        .unwrap();
    ledger
        .create_expense(USER, cash.id, d("50"), Some(food.id), feb)
        .unwrap();
    ledger
        .create_income(USER, cash.id, d("20"), None, feb)
        .unwrap();
    ledger
        .create_refund(
            USER,
            NewRefund {
                original_id: tent.id,
                amount: d("300"),
                date: feb,
                note: Some("returned".into()),
            },
        )
        .unwrap();

    let s = ledger.period_summary(USER, "2025-02").unwrap();
    assert_eq!(s.total_expense, d("50"));
    assert_eq!(s.total_refund, d("300"));
    assert_eq!(s.net_expense, d("-250"));
    assert_eq!(s.balance, d("270"));

    let gear_row = s
        .categories
        .iter()
        .find(|c| c.category_id == Some(gear.id))
        .unwrap();
    assert_eq!(gear_row.net, Decimal::ZERO);
    let food_row = s
        .categories
        .iter()
        .find(|c| c.category_id == Some(food.id))
        .unwrap();
    assert_eq!(food_row.net, d("50"));
}

#[test]
fn transfers_and_repayments_are_not_spending() {
    let mut conn = db::open_in_memory().unwrap();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let bank = ledger
        .create_account(USER, "Bank", AccountKind::Bank, d("5000"))
        .unwrap();
    let cash = ledger
        .create_account(USER, "Cash", AccountKind::Cash, Decimal::ZERO)
        .unwrap();
    let visa = ledger
        .create_account(
            USER,
            "Visa",
            AccountKind::Credit(CreditTerms {
                limit: d("1000"),
                billing_day: 1,
                due_day: 15,
            }),
            Decimal::ZERO,
        )
        .unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
    ledger
        .create_expense(USER, visa.id, d("120"), None, day)
        .unwrap();
    ledger
        .create_transfer(USER, bank.id, cash.id, d("200"), day)
        .unwrap();
    ledger
        .create_repayment(
            USER,
            NewRepayment {
                credit_account_id: visa.id,
                source_account_id: bank.id,
                amount: d("120"),
                category_id: None,
                date: day,
                note: None,
            },
        )
        .unwrap();

    let s = ledger.period_summary(USER, "2025-09").unwrap();
    assert_eq!(s.total_expense, d("120"));
    assert_eq!(s.net_expense, d("120"));
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.categories.len(), 1);
}
