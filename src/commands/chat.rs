// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Routes chat text such as `@حساب صندوق` or `@معاملة دخول إلى @صندوق 500`
//! to the ledger and report operations and renders the reply.

use rusqlite::Connection;

use crate::commands::{accounts, reports, transactions};
use crate::config::Settings;
use crate::error::{ErrorKind, LedgerError, Result};
use crate::models::{EditableField, Transaction, TransactionKind, UserId};
use crate::parser;
use crate::session::{ChatId, Claim, EditSessions};
use crate::utils::{fmt_money, normalize_digits, now_timestamp};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    AddAccount,
    Transaction,
    Report,
    Summary,
    Accounts,
    History,
    CashBalance,
    Monthly,
    AccountTypes,
    Statement,
    Debtors,
    Creditors,
    RenameAccount,
    DeleteAccount,
    DeleteTransaction,
    ShowTransaction,
    EditTransaction,
    Cancel,
    Help,
}

const COMMANDS: &[(&str, Command)] = &[
    ("@حساب", Command::AddAccount),
    ("@معاملة", Command::Transaction),
    ("@كشف", Command::Report),
    ("@ملخص_مالي", Command::Summary),
    ("@الحسابات", Command::Accounts),
    ("@معاملاتي", Command::History),
    ("@الرصيد_الآن", Command::CashBalance),
    ("@تقرير_شهري", Command::Monthly),
    ("@انواع_الحسابات", Command::AccountTypes),
    ("@كشف_حساب", Command::Statement),
    ("@مدينون", Command::Debtors),
    ("@دائنون", Command::Creditors),
    ("@تعديل_حساب", Command::RenameAccount),
    ("@حذف_حساب", Command::DeleteAccount),
    ("@حذف_معاملة", Command::DeleteTransaction),
    ("@معاملة_رقم", Command::ShowTransaction),
    ("@تعديل_معاملة", Command::EditTransaction),
    ("@إلغاء", Command::Cancel),
    ("@مساعدة", Command::Help),
    ("/help", Command::Help),
    ("/start", Command::Help),
];

const HELP: &str = "🆘 **دليل الاستخدام**

**🏦 إدارة الحسابات:**
• `@حساب [اسم]` - إضافة حساب جديد
• `@الحسابات` - عرض جميع الحسابات
• `@تعديل_حساب [القديم] [الجديد]` - إعادة تسمية حساب
• `@حذف_حساب [اسم]` - حذف حساب ومعاملاته

**💸 المعاملات المالية:**
• `@معاملة [تفاصيل]` - تسجيل معاملة
• `@معاملاتي` - عرض آخر المعاملات
• `@معاملة_رقم [رقم]` - تفاصيل معاملة
• `@تعديل_معاملة [رقم] [الحقل]` - تعديل معاملة
• `@حذف_معاملة [رقم]` - حذف معاملة

**📊 التقارير:**
• `@كشف` / `@ملخص_مالي` - الملخص المالي
• `@الرصيد_الآن` - الرصيد النقدي
• `@تقرير_شهري` - تقرير الشهر الحالي
• `@كشف_حساب [اسم]` - حركة حساب
• `@مدينون` / `@دائنون`
• `@انواع_الحسابات` - أنواع الحسابات";

/// Chat front end over one database: parses commands and keeps pending edits.
#[derive(Debug)]
pub struct Dispatcher {
    sessions: EditSessions,
    history_limit: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Dispatcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sessions: EditSessions::from_settings(settings),
            history_limit: settings.history_limit,
        }
    }

    pub fn sessions(&self) -> &EditSessions {
        &self.sessions
    }

    pub fn handle_message(
        &mut self,
        conn: &mut Connection,
        chat: ChatId,
        user: UserId,
        text: &str,
    ) -> String {
        self.handle_message_at(conn, chat, user, text, now_timestamp())
    }

    /// Same as [`Dispatcher::handle_message`] with an explicit clock.
    pub fn handle_message_at(
        &mut self,
        conn: &mut Connection,
        chat: ChatId,
        user: UserId,
        text: &str,
        now: NaiveDateTime,
    ) -> String {
        let reply = match self.dispatch(conn, chat, user, text.trim(), now) {
            Ok(reply) => reply,
            Err(err) => {
                match err.kind() {
                    ErrorKind::Storage => log::error!("user {}: {}", user, err),
                    _ => log::warn!("user {} rejected: {}", user, err),
                }
                err.user_message()
            }
        };
        // After dispatch, so this chat still gets its own expiry notice.
        let purged = self.sessions.purge_expired(now);
        if purged > 0 {
            log::debug!("dropped {} abandoned edits", purged);
        }
        reply
    }

    fn dispatch(
        &mut self,
        conn: &mut Connection,
        chat: ChatId,
        user: UserId,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        accounts::ensure_user(conn, user)?;

        let (word, rest) = split_command(text);
        let Some(command) = lookup(word) else {
            return self.continue_edit(conn, chat, user, text, now);
        };
        log::debug!("user {} in chat {}: {:?}", user, chat, command);

        match command {
            Command::AddAccount => {
                let Some(name) = name_arg(rest) else {
                    return Ok(usage("@حساب [اسم الحساب]"));
                };
                let account = accounts::create_account(conn, user, name)?;
                Ok(format!(
                    "✅ تم إضافة الحساب: {} {}",
                    account.name,
                    account.classification.icon()
                ))
            }
            Command::Transaction => {
                if rest.is_empty() {
                    return Ok(usage("@معاملة [من] [إلى] [المبلغ] [الوصف]"));
                }
                let intent = parser::parse(rest);
                let t = transactions::record_intent(conn, user, &intent)?;
                Ok(recorded_message(&t))
            }
            Command::Report | Command::Summary => Ok(reports::financial_summary(conn, user)?),
            Command::Accounts => Ok(reports::accounts_view(conn, user)?),
            Command::History => Ok(reports::transactions_history(
                conn,
                user,
                self.history_limit,
            )?),
            Command::CashBalance => {
                let cash = reports::cash_balance(conn, user)?;
                Ok(format!(
                    "💰 **الرصيد النقدي الحالي**\n\n📊 إجمالي النقد المتاح: **{}**\n\n💡 هذا الرصيد يشمل جميع الحسابات النقدية (صندوق، بنك، محفظة)",
                    fmt_money(&cash)
                ))
            }
            Command::Monthly => Ok(reports::monthly_report_at(conn, user, now)?),
            Command::AccountTypes => Ok(reports::account_types_info().to_string()),
            Command::Statement => match name_arg(rest) {
                Some(name) => Ok(reports::account_statement(conn, user, name)?),
                None => Ok(usage("@كشف_حساب [اسم الحساب]")),
            },
            Command::Debtors => Ok(reports::debtors_report(conn, user)?),
            Command::Creditors => Ok(reports::creditors_report(conn, user)?),
            Command::RenameAccount => {
                let mut args = rest.split_whitespace().map(strip_mention);
                let (Some(old), Some(new)) = (args.next(), args.next()) else {
                    return Ok(usage("@تعديل_حساب [الاسم القديم] [الاسم الجديد]"));
                };
                let account = accounts::rename_account(conn, user, old, new)?;
                Ok(format!(
                    "✅ تم تعديل الحساب من '{}' إلى '{}' {}",
                    old,
                    account.name,
                    account.classification.icon()
                ))
            }
            Command::DeleteAccount => {
                let Some(name) = name_arg(rest) else {
                    return Ok(usage("@حذف_حساب [اسم الحساب]"));
                };
                let removed = accounts::delete_account(conn, user, name)?;
                Ok(format!(
                    "✅ تم حذف الحساب '{}' و {} معاملة مرتبطة به",
                    name, removed
                ))
            }
            Command::DeleteTransaction => {
                let Some(id) = id_arg(rest) else {
                    return Ok(usage("@حذف_معاملة [رقم المعاملة]"));
                };
                transactions::delete_transaction(conn, user, id)?;
                Ok(format!(
                    "✅ تم حذف المعاملة #{} وإلغاء تأثيرها على الأرصدة",
                    id
                ))
            }
            Command::ShowTransaction => {
                let Some(id) = id_arg(rest) else {
                    return Ok(usage("@معاملة_رقم [رقم المعاملة]"));
                };
                let t = transactions::get_by_id(conn, user, id)?
                    .ok_or(LedgerError::TransactionNotFound(id))?;
                Ok(reports::transaction_details(&t))
            }
            Command::EditTransaction => self.begin_edit(conn, chat, user, rest, now),
            Command::Cancel => Ok(match self.sessions.cancel(chat) {
                Some(edit) => format!("❎ تم إلغاء تعديل المعاملة #{}", edit.transaction_id),
                None => "ℹ️ لا يوجد تعديل قيد الانتظار".to_string(),
            }),
            Command::Help => Ok(HELP.to_string()),
        }
    }

    fn begin_edit(
        &mut self,
        conn: &Connection,
        chat: ChatId,
        user: UserId,
        rest: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        let mut args = rest.split_whitespace();
        let id = args.next().and_then(id_arg);
        let (Some(id), Some(field)) = (id, args.next()) else {
            return Ok(usage(
                "@تعديل_معاملة [رقم المعاملة] [النوع|من|إلى|المبلغ|الوصف]",
            ));
        };
        let field: EditableField = field.parse()?;
        let t = transactions::get_by_id(conn, user, id)?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.sessions.begin(chat, user, t.id, field, now);
        Ok(format!(
            "✏️ أرسل القيمة الجديدة لـ {} للمعاملة #{}\nأو @إلغاء للتراجع",
            field.label(),
            t.id
        ))
    }

    fn continue_edit(
        &mut self,
        conn: &mut Connection,
        chat: ChatId,
        user: UserId,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        match self.sessions.take(chat, user, now) {
            Claim::Ready(edit) => {
                let change = edit.field.with_value(text)?;
                let t = transactions::apply_field_edit(conn, user, edit.transaction_id, change)?;
                Ok(format!(
                    "✅ تم تعديل المعاملة #{} بنجاح\n\n{}",
                    t.id,
                    reports::transaction_details(&t)
                ))
            }
            Claim::Expired(edit) => Ok(format!(
                "⌛ انتهت مهلة تعديل المعاملة #{}، أعد المحاولة باستخدام @تعديل_معاملة",
                edit.transaction_id
            )),
            Claim::Empty => Ok(format!("❓ أمر غير معروف.\n\n{HELP}")),
        }
    }
}

fn lookup(word: &str) -> Option<Command> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, command)| *command)
}

fn split_command(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

/// The whole argument is the account name, so `صندوق المحل` stays one name.
fn name_arg(rest: &str) -> Option<&str> {
    let name = strip_mention(rest.trim()).trim();
    (!name.is_empty()).then_some(name)
}

fn id_arg(rest: &str) -> Option<i64> {
    let raw = rest.split_whitespace().next()?;
    normalize_digits(raw.trim_start_matches('#')).parse().ok()
}

fn strip_mention(s: &str) -> &str {
    s.strip_prefix('@').unwrap_or(s)
}

fn usage(form: &str) -> String {
    format!("❌ الاستخدام: `{form}`")
}

fn recorded_message(t: &Transaction) -> String {
    let amount = fmt_money(&t.amount);
    let from = t.from_account.as_deref().unwrap_or_default();
    let to = t.to_account.as_deref().unwrap_or_default();
    match t.kind {
        TransactionKind::CashIn => format!(
            "✅ تمت معاملة الدخول #{} إلى {} بقيمة {} 💰",
            t.id, to, amount
        ),
        TransactionKind::CashOut => format!(
            "✅ تمت معاملة الخروج #{} من {} بقيمة {} 💸",
            t.id, from, amount
        ),
        TransactionKind::Transfer => format!(
            "✅ تمت معاملة التحويل #{} من {} إلى {} بقيمة {} 🔄",
            t.id, from, to, amount
        ),
    }
}
