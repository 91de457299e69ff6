//! Transaction ledger: free-text entry parsing and fixed-point totals.

use crate::errors::DashboardError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<reason>\S.*?)\s*(?P<op>[+\-\x{2212}])\s*(?P<amount>\d+(?:\.\d{2})?)\s*$")
        .expect("entry pattern is valid")
});

const OPERATORS: [char; 3] = ['+', '-', '\u{2212}'];

/// Money as a signed count of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Rounds a remote float to the nearest cent.
    pub fn from_f64(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Parses `\d+(\.\d{2})?`.
    pub fn parse(text: &str) -> Result<Self, DashboardError> {
        let bad = || DashboardError::Format(format!("invalid amount {text:?}"));
        let (units, fraction) = match text.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (text, "00"),
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(units) || fraction.len() != 2 || !digits(fraction) {
            return Err(bad());
        }
        let units: i64 = units.parse().map_err(|_| bad())?;
        let fraction: i64 = fraction.parse().map_err(|_| bad())?;
        units
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Self)
            .ok_or_else(bad)
    }

    fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Operator used in the text form sent to the remote.
    pub fn operator(self) -> char {
        match self {
            TransactionKind::Credit => '+',
            TransactionKind::Debit => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub reason: String,
    pub amount: Amount,
    pub kind: TransactionKind,
}

impl ParsedEntry {
    /// `"<reason> + <amount>"` or `"<reason> - <amount>"`.
    pub fn to_wire_text(&self) -> String {
        format!("{} {} {}", self.reason, self.kind.operator(), self.amount)
    }
}

/// Parses `<reason> <'+'|'-'|'−'> <amount>`.
pub fn parse_entry(text: &str) -> Result<ParsedEntry, DashboardError> {
    let caps = ENTRY_PATTERN.captures(text).ok_or_else(|| {
        DashboardError::Format(format!(
            "expected '<reason> + <amount>' or '<reason> - <amount>', got {text:?}"
        ))
    })?;

    // One operator only: a signed amount or a second spaced operator is ambiguous.
    let reason = &caps["reason"];
    let has_spaced_operator = [" + ", " - ", " \u{2212} "]
        .iter()
        .any(|op| reason.contains(op));
    if reason.ends_with(OPERATORS) || has_spaced_operator {
        return Err(DashboardError::Format(format!(
            "entry must contain exactly one operator, got {text:?}"
        )));
    }

    let kind = match &caps["op"] {
        "+" => TransactionKind::Credit,
        _ => TransactionKind::Debit,
    };

    Ok(ParsedEntry {
        reason: reason.to_string(),
        amount: Amount::parse(&caps["amount"])?,
        kind,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub id: String,
    pub reason: String,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// ISO-8601 text as issued by the remote.
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total_credit: Amount,
    pub total_debit: Amount,
    pub net_amount: Amount,
}

pub fn summarize(records: &[TransactionRecord]) -> LedgerSummary {
    let mut summary = LedgerSummary::default();
    for record in records {
        match record.kind {
            TransactionKind::Credit => {
                summary.total_credit = summary.total_credit.saturating_add(record.amount)
            }
            TransactionKind::Debit => {
                summary.total_debit = summary.total_debit.saturating_add(record.amount)
            }
        }
    }
    summary.net_amount = summary.total_credit.saturating_sub(summary.total_debit);
    summary
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummaryCheck {
    /// No server summary to compare against.
    #[default]
    Local,
    Agreed,
    Mismatch { server: LedgerSummary },
}

/// The locally computed summary is canonical; a differing server summary is
/// reported, never blended in.
pub fn reconcile(local: &LedgerSummary, server: Option<LedgerSummary>) -> SummaryCheck {
    match server {
        None => SummaryCheck::Local,
        Some(server) if server == *local => SummaryCheck::Agreed,
        Some(server) => {
            warn!(
                local_net = %local.net_amount,
                server_net = %server.net_amount,
                "ledger summary differs from server summary"
            );
            SummaryCheck::Mismatch { server }
        }
    }
}

/// Most recent first; equal timestamps keep the fetch order.
pub fn sort_for_display(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<TransactionRecord>,
    summary: LedgerSummary,
    check: SummaryCheck,
}

impl Ledger {
    /// Replaces the whole ledger with an authoritative fetch.
    pub fn replace(&mut self, mut records: Vec<TransactionRecord>, server: Option<LedgerSummary>) {
        sort_for_display(&mut records);
        let summary = summarize(&records);
        self.check = reconcile(&summary, server);
        self.summary = summary;
        self.records = records;
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn summary(&self) -> LedgerSummary {
        self.summary
    }

    pub fn check(&self) -> SummaryCheck {
        self.check
    }
}
