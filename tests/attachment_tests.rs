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
use tallybook::models::AccountKind;
use tallybook::{Ledger, LedgerError, db};

struct NoFiles;

impl FileStore for NoFiles {
    fn delete_stored_file(&self, _: &str) -> io::Result<()> {
        Ok(())
    }
}

const USER: i64 = 1;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn two_expenses(ledger: &mut Ledger) -> (i64, i64) {
    let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let cash = ledger
        .create_account(USER, "Cash", AccountKind::Cash, Decimal::from(500))
        .unwrap();
    let a = ledger
        .create_expense(USER, cash.id, Decimal::from(10), None, day)
        .unwrap();
    let b = ledger
        .create_expense(USER, cash.id, Decimal::from(20), None, day)
        .unwrap();
    (a.id, b.id)
}

#[test]
fn link_is_all_or_nothing() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let (first, second) = two_expenses(&mut ledger);
    let x = ledger.register_attachment(USER, "x.jpg").unwrap();
    let y = ledger.register_attachment(USER, "y.jpg").unwrap();
    let z = ledger.register_attachment(USER, "z.jpg").unwrap();
    ledger.link_attachments(USER, &[z.id], second).unwrap();

    let err = ledger
        .link_attachments(USER, &[x.id, y.id, z.id], first)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::AlreadyLinked { attachment_id, transaction_id }
            if attachment_id == z.id && transaction_id == second
    ));
    assert!(ledger.attachments_for(USER, first).unwrap().is_empty());

    let err = ledger
        .link_attachments(USER, &[x.id, 777], first)
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    assert!(ledger.attachments_for(USER, first).unwrap().is_empty());

    let linked = ledger.link_attachments(USER, &[x.id, y.id], first).unwrap();
    assert_eq!(linked.len(), 2);
    assert!(linked.iter().all(|a| a.transaction_id == Some(first)));
}

#[test]
fn relinking_to_the_same_transaction_is_a_no_op() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let (first, _) = two_expenses(&mut ledger);
    let x = ledger.register_attachment(USER, "x.jpg").unwrap();

    ledger.link_attachments(USER, &[x.id], first).unwrap();
    let again = ledger.link_attachments(USER, &[x.id, x.id], first).unwrap();

    assert_eq!(again.len(), 2);
    assert_eq!(ledger.attachments_for(USER, first).unwrap().len(), 1);
}

#[test]
fn other_users_attachments_are_forbidden() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let (first, _) = two_expenses(&mut ledger);
    let theirs = ledger.register_attachment(2, "private.jpg").unwrap();

    let err = ledger
        .link_attachments(USER, &[theirs.id], first)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden { entity: "attachment", .. }));
    assert_eq!(
        ledger
            .link_attachments(2, &[theirs.id], first)
            .unwrap_err()
            .code(),
        "FORBIDDEN"
    );
    assert_eq!(ledger.unlink_attachment(USER, theirs.id).unwrap_err().code(), "FORBIDDEN");
}

#[test]
fn unlinked_attachments_can_move() {
    let mut conn = setup();
    let mut ledger = Ledger::new(&mut conn, &NoFiles);
    let (first, second) = two_expenses(&mut ledger);
    let x = ledger.register_attachment(USER, "x.jpg").unwrap();
    ledger.link_attachments(USER, &[x.id], first).unwrap();

    let freed = ledger.unlink_attachment(USER, x.id).unwrap();
    assert_eq!(freed.transaction_id, None);
    ledger.link_attachments(USER, &[x.id], second).unwrap();

    assert!(ledger.attachments_for(USER, first).unwrap().is_empty());
    assert_eq!(ledger.attachments_for(USER, second).unwrap()[0].id, x.id);
}
