// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Asset,
    ForUs,
    ForThem,
    Expense,
    Revenue,
    General,
}

impl Classification {
    pub const ALL: [Classification; 6] = [
        Classification::Asset,
        Classification::ForUs,
        Classification::ForThem,
        Classification::Expense,
        Classification::Revenue,
        Classification::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Asset => "asset",
            Classification::ForUs => "for_us",
            Classification::ForThem => "for_them",
            Classification::Expense => "expense",
            Classification::Revenue => "revenue",
            Classification::General => "general",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Classification::Asset => "💰",
            Classification::ForUs => "📈",
            Classification::ForThem => "📉",
            Classification::Expense => "💸",
            Classification::Revenue => "💵",
            Classification::General => "📊",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Asset => "أصول نقدية",
            Classification::ForUs => "لنا",
            Classification::ForThem => "لهم",
            Classification::Expense => "مصاريف",
            Classification::Revenue => "إيرادات",
            Classification::General => "عام",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LedgerError::Corrupt {
                column: "accounts.account_type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    CashIn,
    CashOut,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::CashIn => "cash_in",
            TransactionKind::CashOut => "cash_out",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TransactionKind::CashIn => "💰",
            TransactionKind::CashOut => "💸",
            TransactionKind::Transfer => "🔄",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::CashIn => "دخول نقدي",
            TransactionKind::CashOut => "خروج نقدي",
            TransactionKind::Transfer => "تحويل",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the stored names plus the Arabic words users type.
impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cash_in" | "cash-in" | "دخول" | "إيداع" => Ok(TransactionKind::CashIn),
            "cash_out" | "cash-out" | "خروج" | "سحب" => Ok(TransactionKind::CashOut),
            "transfer" | "تحويل" => Ok(TransactionKind::Transfer),
            other => Err(LedgerError::InvalidField {
                field: "kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Which side of a transaction an account sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    Source,
    Destination,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Source => f.write_str("الحساب المرسل"),
            AccountRole::Destination => f.write_str("الحساب المستقبل"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub balance: Decimal,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Decimal,
    pub memo: String,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn references(&self, account: &str) -> bool {
        self.from_account.as_deref() == Some(account) || self.to_account.as_deref() == Some(account)
    }
}

/// Parsed transaction command, before any validation against storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub kind: TransactionKind,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Option<String>,
    pub memo: String,
    pub mentioned_accounts: Vec<String>,
}

/// Full replacement values for an existing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: String,
    pub memo: String,
}

impl From<&Transaction> for TransactionDraft {
    fn from(t: &Transaction) -> Self {
        Self {
            kind: t.kind,
            from_account: t.from_account.clone(),
            to_account: t.to_account.clone(),
            amount: t.amount.to_string(),
            memo: t.memo.clone(),
        }
    }
}

/// A single field change on a stored transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditField {
    Kind(TransactionKind),
    FromAccount(String),
    ToAccount(String),
    Amount(String),
    Memo(String),
}

/// Field selector used while an edit waits for its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Kind,
    FromAccount,
    ToAccount,
    Amount,
    Memo,
}

impl EditableField {
    pub fn with_value(self, text: &str) -> Result<EditField, LedgerError> {
        let text = text.trim();
        Ok(match self {
            EditableField::Kind => EditField::Kind(text.parse()?),
            EditableField::FromAccount => EditField::FromAccount(strip_mention(text).to_string()),
            EditableField::ToAccount => EditField::ToAccount(strip_mention(text).to_string()),
            EditableField::Amount => EditField::Amount(text.to_string()),
            EditableField::Memo => EditField::Memo(text.to_string()),
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditableField::Kind => "نوع المعاملة",
            EditableField::FromAccount => "الحساب المرسل",
            EditableField::ToAccount => "الحساب المستقبل",
            EditableField::Amount => "المبلغ",
            EditableField::Memo => "الوصف",
        }
    }
}

impl FromStr for EditableField {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kind" | "type" | "النوع" => Ok(EditableField::Kind),
            "from" | "من" => Ok(EditableField::FromAccount),
            "to" | "إلى" => Ok(EditableField::ToAccount),
            "amount" | "المبلغ" => Ok(EditableField::Amount),
            "memo" | "note" | "الوصف" => Ok(EditableField::Memo),
            other => Err(LedgerError::InvalidField {
                field: "field".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

fn strip_mention(text: &str) -> &str {
    text.strip_prefix('@').unwrap_or(text)
}
