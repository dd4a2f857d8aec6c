// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Business-rule rejections raised by the ledger.

/// Errors returned by ledger operations.
///
/// Every variant except [`LedgerError::Store`] and [`LedgerError::File`] is
/// a business-rule rejection detected before any row is written.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A non-positive amount was given for a transaction or repayment.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// A non-positive amount was given for a refund.
    #[error("refund amount must be greater than zero")]
    RefundAmountInvalid,

    /// The refund is larger than what remains refundable on the expense.
    #[error("refund of {requested} exceeds the refundable amount {refundable}")]
    RefundAmountExceeded {
        requested: rust_decimal::Decimal,
        refundable: rust_decimal::Decimal,
    },

    /// The expense has already been refunded in full.
    #[error("the original expense has already been fully refunded")]
    RefundAlreadyFull,

    /// The refund target is not an expense, or the transaction type does
    /// not support the requested edit.
    #[error("transaction {0} is not of the required type")]
    RefundInvalidType(i64),

    /// The repayment source account does not hold enough money.
    #[error("insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance {
        requested: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// The account type cannot take part in this kind of transaction.
    #[error("account {0} cannot be used for this transaction type")]
    InvalidAccountType(i64),

    /// Credit limit or billing/due days are out of range.
    #[error("invalid credit terms: {0}")]
    InvalidCreditTerms(String),

    /// Repayments must be funded from a non-credit account.
    #[error("account {0} cannot fund a repayment")]
    InvalidSourceAccount(i64),

    /// Repayments must target a credit account.
    #[error("account {0} is not a credit account")]
    InvalidCreditAccount(i64),

    /// The entity belongs to another user.
    #[error("{entity} {id} belongs to another user")]
    Forbidden { entity: &'static str, id: i64 },

    /// The entity does not exist.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },

    /// The attachment is already linked to a different transaction.
    #[error("attachment {attachment_id} is already linked to transaction {transaction_id}")]
    AlreadyLinked {
        attachment_id: i64,
        transaction_id: i64,
    },

    /// Attachment paths must stay inside the attachments root.
    #[error("storage path '{0}' must be relative and stay inside the attachments root")]
    InvalidStoragePath(String),

    /// Copying a file into the attachments root failed.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),

    /// Opaque failure of the backing store.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl LedgerError {
    /// The stable error code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::RefundAmountInvalid => "REFUND_AMOUNT_INVALID",
            LedgerError::RefundAmountExceeded { .. } => "REFUND_AMOUNT_EXCEEDED",
            LedgerError::RefundAlreadyFull => "REFUND_ALREADY_FULL",
            LedgerError::RefundInvalidType(_) => "REFUND_INVALID_TYPE",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::InvalidAccountType(_) => "INVALID_ACCOUNT_TYPE",
            LedgerError::InvalidCreditTerms(_) => "INVALID_CREDIT_TERMS",
            LedgerError::InvalidSourceAccount(_) => "INVALID_SOURCE_ACCOUNT",
            LedgerError::InvalidCreditAccount(_) => "INVALID_CREDIT_ACCOUNT",
            LedgerError::Forbidden { .. } => "FORBIDDEN",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::AlreadyLinked { .. } => "ALREADY_LINKED",
            LedgerError::InvalidStoragePath(_) => "INVALID_STORAGE_PATH",
            LedgerError::File(_) => "FILE_ERROR",
            LedgerError::Store(_) => "STORE_ERROR",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
