// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod attachments;
pub mod categories;
pub mod exporter;
pub mod refunds;
pub mod reminders;
pub mod repayments;
pub mod stats;
pub mod transactions;

use crate::utils::parse_date;
use anyhow::Result;
use chrono::NaiveDate;

/// Date given in `arg`, or the local date when absent.
pub(crate) fn date_or_today(sub: &clap::ArgMatches, arg: &str) -> Result<NaiveDate> {
    match sub.get_one::<String>(arg) {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
