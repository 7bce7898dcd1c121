// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::accounts::{MAX_ACCOUNTS, get_account, list_accounts};
use crate::commands::transactions::{
    MAX_HISTORY, balance_effects, list_for_account, list_recent, list_since,
};
use crate::error::{LedgerError, Result};
use crate::models::{Account, Classification, Transaction, TransactionKind, UserId};
use crate::utils::{
    checked_add, checked_sum, fmt_money, format_balance_status, format_timestamp,
    maybe_print_json, month_start, now_timestamp, required_arg,
};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

const MONTHLY_PREVIEW: usize = 5;
const ADD_ACCOUNT_HINT: &str = "لا توجد حسابات مسجلة بعد.\nاستخدم @حساب [اسم الحساب] لإضافة حساب جديد.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    Positive,
    Negative,
    Balanced,
}

impl FinancialStatus {
    fn of(net_worth: &Decimal) -> Self {
        if *net_worth > Decimal::ZERO {
            FinancialStatus::Positive
        } else if *net_worth < Decimal::ZERO {
            FinancialStatus::Negative
        } else {
            FinancialStatus::Balanced
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FinancialStatus::Positive => "✅ الوضع المالي: إيجابي 💚",
            FinancialStatus::Negative => "⚠️ الوضع المالي: سلبي 🔴",
            FinancialStatus::Balanced => "⚖️ الوضع المالي: متوازن 🟡",
        }
    }
}

/// Per-classification totals over a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub assets: Decimal,
    pub for_us: Decimal,
    pub for_them: Decimal,
    pub expenses: Decimal,
    pub revenues: Decimal,
    pub general: Decimal,
    pub total: Decimal,
    pub total_cash: Decimal,
    pub net_worth: Decimal,
    pub status: FinancialStatus,
    pub accounts: Vec<Account>,
}

impl FinancialSummary {
    fn accounts_of(&self, class: Classification) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(move |a| a.classification == class)
    }
}

/// Fails with `AmountOverflow` when a bucket no longer fits in a `Decimal`.
pub fn summarize(accounts: &[Account]) -> Result<FinancialSummary> {
    let mut s = FinancialSummary {
        assets: Decimal::ZERO,
        for_us: Decimal::ZERO,
        for_them: Decimal::ZERO,
        expenses: Decimal::ZERO,
        revenues: Decimal::ZERO,
        general: Decimal::ZERO,
        total: Decimal::ZERO,
        total_cash: Decimal::ZERO,
        net_worth: Decimal::ZERO,
        status: FinancialStatus::Balanced,
        accounts: accounts.to_vec(),
    };
    for a in accounts {
        let b = a.balance;
        s.total = checked_add(s.total, b)?;
        let (bucket, value) = match a.classification {
            Classification::Asset => {
                s.total_cash = checked_add(s.total_cash, b)?;
                (&mut s.assets, b)
            }
            // A negative counterparty balance lands in the opposite bucket.
            Classification::ForUs if b < Decimal::ZERO => (&mut s.for_them, b.abs()),
            Classification::ForUs => (&mut s.for_us, b),
            Classification::ForThem if b < Decimal::ZERO => (&mut s.for_us, b.abs()),
            Classification::ForThem => (&mut s.for_them, b),
            Classification::Expense => (&mut s.expenses, b.abs()),
            Classification::Revenue => (&mut s.revenues, b),
            Classification::General => (&mut s.general, b),
        };
        *bucket = checked_add(*bucket, value)?;
    }
    s.net_worth = checked_add(s.assets, s.for_us)?
        .checked_sub(s.for_them)
        .ok_or(LedgerError::AmountOverflow)?;
    s.status = FinancialStatus::of(&s.net_worth);
    Ok(s)
}

pub fn render_summary(s: &FinancialSummary) -> String {
    if s.accounts.is_empty() {
        return format!("📄 {ADD_ACCOUNT_HINT}");
    }
    let mut out = String::from("📊 **الملخص المالي الشامل**\n");
    out += &"=".repeat(35);
    out += "\n\n";

    let sections: [(Classification, &str, Option<&Decimal>, bool); 6] = [
        (Classification::Asset, "💰 **الأصول النقدية:**", Some(&s.assets), true),
        (Classification::ForUs, "📈 **الحسابات (لنا/لهم):**", None, true),
        (Classification::ForThem, "📉 **حسابات الموردين:**", None, true),
        (Classification::Revenue, "💵 **الإيرادات:**", Some(&s.revenues), false),
        (Classification::Expense, "💸 **المصاريف:**", Some(&s.expenses), false),
        (Classification::General, "📊 **حسابات عامة:**", Some(&s.general), true),
    ];
    for (class, title, subtotal, with_status) in sections {
        let mut members = s.accounts_of(class).peekable();
        if members.peek().is_none() {
            continue;
        }
        out += title;
        out += "\n";
        for a in members {
            let shown = if with_status {
                format_balance_status(&a.balance)
            } else {
                fmt_money(&a.balance)
            };
            out += &format!("   • {}: {}\n", a.name, shown);
        }
        if let Some(total) = subtotal {
            out += &format!("   **المجموع:** {}\n", fmt_money(total));
        }
        out += "\n";
    }

    out += "🎯 **الملخص النهائي:**\n";
    out += &"-".repeat(25);
    out += "\n";
    out += &format!("💰 إجمالي النقد: {}\n", fmt_money(&s.total_cash));
    out += &format!("📈 إجمالي لنا: {}\n", fmt_money(&s.for_us));
    out += &format!("📉 إجمالي لهم: {}\n", fmt_money(&s.for_them));
    out += &format!("💵 إجمالي الإيرادات: {}\n", fmt_money(&s.revenues));
    out += &format!("💸 إجمالي المصاريف: {}\n", fmt_money(&s.expenses));
    out += &format!("📊 **الرصيد الإجمالي:** {}\n", fmt_money(&s.total));
    out += &format!("💎 **صافي الثروة:** {}\n", fmt_money(&s.net_worth));
    out += s.status.message();
    out
}

pub fn financial_summary(conn: &Connection, user: UserId) -> Result<String> {
    let summary = summarize(&list_accounts(conn, user)?)?;
    log::debug!("summary for user {}: net worth {}", user, summary.net_worth);
    Ok(render_summary(&summary))
}

pub fn accounts_view(conn: &Connection, user: UserId) -> Result<String> {
    let accounts = list_accounts(conn, user)?;
    if accounts.is_empty() {
        return Ok(format!("📋 {ADD_ACCOUNT_HINT}"));
    }
    let mut out = String::from("📋 **قائمة الحسابات:**\n");
    out += &"=".repeat(25);
    out += "\n";
    for (i, a) in accounts.iter().enumerate() {
        out += &format!(
            "{}. {} {}: {}\n",
            i + 1,
            a.name,
            a.classification.icon(),
            format_balance_status(&a.balance)
        );
    }
    out += &format!("\n📊 المجموع: {}/{} حسابات", accounts.len(), MAX_ACCOUNTS);
    Ok(out)
}

pub fn monthly_report(conn: &Connection, user: UserId) -> Result<String> {
    monthly_report_at(conn, user, now_timestamp())
}

/// Rollup of the calendar month (UTC) containing `now`.
pub fn monthly_report_at(conn: &Connection, user: UserId, now: NaiveDateTime) -> Result<String> {
    let header = format!("📅 **تقرير شهر {}**", now.format("%m/%Y"));
    let txs = list_since(conn, user, &month_start(&now))?;
    log::debug!("monthly report for user {}: {} transactions", user, txs.len());
    if txs.is_empty() {
        return Ok(format!("{header}\n\nلا توجد معاملات هذا الشهر."));
    }

    let total_of = |kind: TransactionKind| -> Result<Decimal> {
        checked_sum(txs.iter().filter(|t| t.kind == kind).map(|t| t.amount))
    };
    let cash_in = total_of(TransactionKind::CashIn)?;
    let cash_out = total_of(TransactionKind::CashOut)?;
    let transfers = total_of(TransactionKind::Transfer)?;
    let total = checked_sum(txs.iter().map(|t| t.amount))?;
    let average = total / Decimal::from(txs.len());

    let mut out = format!("{header}\n");
    out += &"=".repeat(30);
    out += "\n";
    out += &format!("📊 عدد المعاملات: {}\n", txs.len());
    out += &format!("💰 إجمالي الدخول النقدي: {}\n", fmt_money(&cash_in));
    out += &format!("💸 إجمالي الخروج النقدي: {}\n", fmt_money(&cash_out));
    out += &format!("🔄 إجمالي التحويلات: {}\n", fmt_money(&transfers));
    out += &format!("📈 متوسط المعاملة: {}\n\n", fmt_money(&average));

    out += "📝 **المعاملات:**\n";
    for t in txs.iter().take(MONTHLY_PREVIEW) {
        let date = format_timestamp(&t.created_at);
        let amount = fmt_money(&t.amount);
        let line = match t.kind {
            TransactionKind::CashIn => format!("دخول إلى {} ({amount})", side(&t.to_account)),
            TransactionKind::CashOut => format!("خروج من {} ({amount})", side(&t.from_account)),
            TransactionKind::Transfer => format!(
                "{} → {} ({amount})",
                side(&t.from_account),
                side(&t.to_account)
            ),
        };
        out += &format!("• {date}: {line}\n");
    }
    if txs.len() > MONTHLY_PREVIEW {
        out += &format!("... و {} معاملات أخرى", txs.len() - MONTHLY_PREVIEW);
    }
    Ok(out)
}

/// Last transactions touching `name`, signed from that account's point of view.
pub fn account_statement(conn: &Connection, user: UserId, name: &str) -> Result<String> {
    let snapshot = conn.unchecked_transaction()?;
    let account = get_account(&snapshot, user, name)?
        .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))?;
    let txs = list_for_account(&snapshot, user, name, MAX_HISTORY)?;
    drop(snapshot);

    let mut out = format!(
        "📄 **كشف حساب {}** {}\n",
        account.name,
        account.classification.icon()
    );
    out += &"=".repeat(30);
    out += "\n";
    if txs.is_empty() {
        out += "لا توجد معاملات على هذا الحساب.\n";
    }
    for t in &txs {
        let delta = checked_sum(
            balance_effects(t)
                .into_iter()
                .filter(|(acc, _)| *acc == account.name)
                .map(|(_, d)| d),
        )?;
        let signed = if delta < Decimal::ZERO {
            format!("-{}", fmt_money(&delta.abs()))
        } else {
            format!("+{}", fmt_money(&delta))
        };
        out += &format!(
            "• #{} {} | {} {} | {}",
            t.id,
            format_timestamp(&t.created_at),
            t.kind.icon(),
            counterparty(t, &account.name),
            signed
        );
        if !t.memo.is_empty() {
            out += &format!(" | {}", t.memo);
        }
        out += "\n";
    }
    out += &format!("\n💼 الرصيد النهائي: {}", format_balance_status(&account.balance));
    Ok(out)
}

fn counterparty(t: &Transaction, account: &str) -> String {
    match t.kind {
        TransactionKind::CashIn => TransactionKind::CashIn.label().to_string(),
        TransactionKind::CashOut => TransactionKind::CashOut.label().to_string(),
        TransactionKind::Transfer if t.from_account.as_deref() == Some(account) => {
            format!("إلى {}", side(&t.to_account))
        }
        TransactionKind::Transfer => format!("من {}", side(&t.from_account)),
    }
}

fn side(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("-")
}

/// Accounts holding a positive balance.
pub fn debtors_report(conn: &Connection, user: UserId) -> Result<String> {
    let accounts = list_accounts(conn, user)?;
    render_balances(
        "🔴 الحسابات التي تدين لنا:",
        accounts.iter().filter(|a| a.balance > Decimal::ZERO),
    )
}

/// Accounts holding a negative balance, shown as absolute values.
pub fn creditors_report(conn: &Connection, user: UserId) -> Result<String> {
    let accounts = list_accounts(conn, user)?;
    render_balances(
        "🟢 الحسابات التي نحن مدينون لها:",
        accounts.iter().filter(|a| a.balance < Decimal::ZERO),
    )
}

fn render_balances<'a>(
    title: &str,
    accounts: impl Iterator<Item = &'a Account>,
) -> Result<String> {
    let mut out = format!("{title}\n");
    let mut total = Decimal::ZERO;
    for a in accounts {
        out += &format!("🔹 {}: {}\n", a.name, fmt_money(&a.balance.abs()));
        total = checked_add(total, a.balance.abs())?;
    }
    out += &format!("============\n💼 المجموع: {}", fmt_money(&total));
    Ok(out)
}

pub fn transactions_history(conn: &Connection, user: UserId, limit: usize) -> Result<String> {
    let txs = list_recent(conn, user, limit)?;
    if txs.is_empty() {
        return Ok(
            "📝 لا توجد معاملات مسجلة بعد.\nاستخدم @معاملة [من] [إلى] [المبلغ] لإضافة معاملة."
                .to_string(),
        );
    }
    let mut out = format!("📝 **آخر {} معاملات:**\n", txs.len());
    out += &"=".repeat(35);
    out += "\n";
    for t in &txs {
        out += &format!("🔹 **المعاملة #{}**\n", t.id);
        out += &format!("📅 {}\n", format_timestamp(&t.created_at));
        let amount = fmt_money(&t.amount);
        out += &match t.kind {
            TransactionKind::CashIn => {
                format!("💰 دخول نقدي إلى {}: {amount}\n", side(&t.to_account))
            }
            TransactionKind::CashOut => {
                format!("💸 خروج نقدي من {}: {amount}\n", side(&t.from_account))
            }
            TransactionKind::Transfer => format!(
                "🔄 تحويل من {} إلى {}: {amount}\n",
                side(&t.from_account),
                side(&t.to_account)
            ),
        };
        if !t.memo.is_empty() {
            out += &format!("📝 {}\n", t.memo);
        }
        out += &"-".repeat(30);
        out += "\n";
    }
    Ok(out)
}

/// Sum of all asset-classified balances.
pub fn cash_balance(conn: &Connection, user: UserId) -> Result<Decimal> {
    checked_sum(
        list_accounts(conn, user)?
            .iter()
            .filter(|a| a.classification == Classification::Asset)
            .map(|a| a.balance),
    )
}

pub fn transaction_details(t: &Transaction) -> String {
    let mut out = format!("📋 **تفاصيل المعاملة #{}**\n\n", t.id);
    out += &format!("{} **نوع المعاملة:** {}\n", t.kind.icon(), t.kind.label());
    if let Some(from) = &t.from_account {
        out += &format!("📤 **من الحساب:** {from}\n");
    }
    if let Some(to) = &t.to_account {
        out += &format!("📥 **إلى الحساب:** {to}\n");
    }
    out += &format!("💰 **المبلغ:** {}\n", fmt_money(&t.amount));
    out += &format!("📅 **التاريخ:** {}\n", format_timestamp(&t.created_at));
    if !t.memo.is_empty() {
        out += &format!("📝 **الوصف:** {}\n", t.memo);
    }
    out
}

pub fn account_types_info() -> &'static str {
    "ℹ️ **أنواع الحسابات المدعومة**

**💰 الأصول النقدية:**
• صندوق، بنك، نقد، محفظة، خزنة
• تمثل الأموال المتاحة لديك

**📈 لنا (العملاء والمدينون):**
• عميل، زبون، مشتري
• الأشخاص الذين يدينون لك بأموال

**📉 لهم (الموردون والدائنون):**
• مورد، بائع، مقاول
• الأشخاص الذين تدين لهم بأموال

**💸 المصاريف:**
• مصروف، إيجار، راتب، كهرباء، ماء
• النفقات والتكاليف

**💵 الإيرادات:**
• مبيعات، دخل، ربح
• مصادر الدخل

**📊 حسابات عامة:**
• أي حساب لا يندرج تحت الفئات السابقة

💡 **النظام يتعرف تلقائياً على نوع الحساب من اسمه!**"
}

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("accounts", sub)) => {
            let accounts = list_accounts(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), &accounts)? {
                println!("{}", accounts_view(conn, user)?);
            }
        }
        Some(("summary", sub)) => {
            let summary = summarize(&list_accounts(conn, user)?)?;
            if !maybe_print_json(sub.get_flag("json"), &summary)? {
                println!("{}", render_summary(&summary));
            }
        }
        Some(("monthly", _)) => println!("{}", monthly_report(conn, user)?),
        Some(("statement", sub)) => {
            let name = required_arg(sub, "name")?;
            println!("{}", account_statement(conn, user, name)?);
        }
        Some(("debtors", _)) => println!("{}", debtors_report(conn, user)?),
        Some(("creditors", _)) => println!("{}", creditors_report(conn, user)?),
        Some(("cash", _)) => println!("💰 الرصيد النقدي الحالي: {}", fmt_money(&cash_balance(conn, user)?)),
        Some(("history", sub)) => {
            let limit = sub.get_one::<usize>("limit").copied().unwrap_or(MAX_HISTORY);
            if sub.get_flag("json") {
                maybe_print_json(true, &list_recent(conn, user, limit)?)?;
            } else {
                println!("{}", transactions_history(conn, user, limit)?);
            }
        }
        Some(("types", _)) => println!("{}", account_types_info()),
        _ => {}
    }
    Ok(())
}
