// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::models::AccountRole;

/// Broad error families surfaced to the chat layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    SameAccount,
    Storage,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("❌ يرجى إدخال مبلغ صحيح أكبر من الصفر: '{0}'")]
    InvalidAmount(String),

    #[error("❌ المبلغ كبير جداً ويتجاوز الحد المسموح")]
    AmountOverflow,

    #[error("❌ اسم الحساب لا يمكن أن يكون فارغاً")]
    EmptyAccountName,

    #[error("❌ اسم الحساب طويل جداً (الحد الأقصى {0} حرف)")]
    AccountNameTooLong(usize),

    #[error("❌ اسم الحساب يحتوي على أحرف غير مسموحة: {0}")]
    ForbiddenCharacters(String),

    #[error("❌ يوجد حساب بالاسم '{0}' مسبقاً")]
    DuplicateAccount(String),

    #[error("❌ لا يمكنك إضافة أكثر من {0} حسابات.")]
    AccountLimit(usize),

    #[error("❌ لم يتم العثور على مبلغ صحيح في النص")]
    MissingAmount,

    #[error("❌ لم يتم تحديد {0}")]
    MissingAccount(AccountRole),

    #[error("❌ قيمة غير صالحة للحقل '{field}': {value}")]
    InvalidField { field: String, value: String },

    #[error("❌ الحساب '{0}' غير موجود")]
    AccountNotFound(String),

    #[error("❌ المعاملة #{0} غير موجودة")]
    TransactionNotFound(i64),

    #[error("❌ لا يمكن إجراء معاملة من نفس الحساب إلى نفسه")]
    SameAccount,

    #[error("❌ خطأ في قاعدة البيانات: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("❌ قيمة مخزنة تالفة '{value}' في {column}")]
    Corrupt { column: &'static str, value: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount(_)
            | LedgerError::AmountOverflow
            | LedgerError::EmptyAccountName
            | LedgerError::AccountNameTooLong(_)
            | LedgerError::ForbiddenCharacters(_)
            | LedgerError::DuplicateAccount(_)
            | LedgerError::AccountLimit(_)
            | LedgerError::MissingAmount
            | LedgerError::MissingAccount(_)
            | LedgerError::InvalidField { .. } => ErrorKind::Validation,
            LedgerError::AccountNotFound(_) | LedgerError::TransactionNotFound(_) => {
                ErrorKind::NotFound
            }
            LedgerError::SameAccount => ErrorKind::SameAccount,
            LedgerError::Storage(_) | LedgerError::Corrupt { .. } => ErrorKind::Storage,
        }
    }

    /// Text safe to send back to a chat user. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Storage => "❌ حدث خطأ أثناء حفظ البيانات، يرجى المحاولة مرة أخرى".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
