//! Record cleanup: names, calendar dates and amounts.
//!
//! Every raw record maps to exactly one [`NormalizedTransaction`] or one
//! [`RejectReason`]. Nothing here consults the local timezone.

use crate::domain::model::{
    NormalizedTransaction, RawAmount, RawTransaction, RecordSet, RejectReason, Rejection,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

const NAME_AFFIXES: &[&str] = &["mr", "ms", "mrs", "jr", "sr", "ii", "iii", "iv"];

/// Trims and collapses internal whitespace, keeping the original casing.
pub fn display_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical comparison key for a person's name.
///
/// Case-folds, drops punctuation, honorifics, generational suffixes and
/// single-letter initials, then sorts the remaining tokens so that
/// `"SMITH, BRADFORD L."` and `"Bradford L. Smith"` compare equal.
/// A name made only of initials keeps them rather than collapsing to empty.
pub fn name_key(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let parts: Vec<&str> = folded
        .split_whitespace()
        .filter(|p| !NAME_AFFIXES.contains(p))
        .collect();

    let mut kept: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|p| p.chars().count() > 1)
        .collect();
    if kept.is_empty() {
        kept = parts;
    }
    kept.sort_unstable();
    kept.join(" ")
}

/// Case-folded, whitespace-collapsed key for employers and committee names.
pub fn label_key(raw: &str) -> String {
    display_name(raw).to_lowercase()
}

/// Parses a fixed `YYYY-MM-DD` calendar date.
///
/// A trailing `T...` time component (as some upstream exports attach) is
/// discarded without interpretation; the calendar day is taken verbatim.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, RejectReason> {
    let trimmed = raw.trim();
    let day = trimmed.split_once('T').map_or(trimmed, |(day, _)| day);

    let reject = || RejectReason::MalformedDate {
        value: raw.to_string(),
    };

    let bytes = day.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(reject());
    }

    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| reject())
}

/// Coerces an upstream amount to an exact decimal. Never defaults to zero.
///
/// JSON numbers are read through their shortest decimal text, so `0.1`
/// becomes exactly `0.1`.
pub fn parse_amount(raw: Option<&RawAmount>) -> Result<Decimal, RejectReason> {
    let parsed = match raw {
        Some(RawAmount::Number(n)) if n.is_finite() => Decimal::from_str(&n.to_string()).ok(),
        Some(RawAmount::Text(s)) => parse_money_text(s),
        Some(RawAmount::Number(_)) | Some(RawAmount::Other(_)) | None => None,
    };

    parsed.ok_or_else(|| RejectReason::MalformedAmount {
        value: raw.map(|a| a.to_string()).unwrap_or_default(),
    })
}

/// `1,250.50`, `$100`, `-$500` and `$-500` are all accepted.
fn parse_money_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let (negative, rest) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let digits = rest.strip_prefix('$').unwrap_or(rest);
    if negative && digits.starts_with(['-', '+']) {
        return None;
    }

    let value = Decimal::from_str(digits).ok()?;
    Some(if negative { -value } else { value })
}

pub fn normalize(raw: &RawTransaction) -> Result<NormalizedTransaction, RejectReason> {
    let transaction_id = raw
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(RejectReason::MissingIdentifier)?
        .to_string();
    let date = parse_calendar_date(&raw.date)?;
    let amount = parse_amount(raw.amount.as_ref())?;

    let donor_name = display_name(&raw.donor_name);
    let donor_employer = display_name(raw.donor_employer.as_deref().unwrap_or_default());
    let recipient_name = display_name(&raw.recipient_name);
    let recipient_id = raw
        .recipient_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let mut tx = NormalizedTransaction {
        transaction_id,
        donor_name,
        donor_key: String::new(),
        donor_employer,
        employer_key: String::new(),
        donor_info: display_name(&raw.donor_info),
        recipient_name,
        recipient_id,
        recipient_key: String::new(),
        recipient_party: display_name(raw.recipient_party.as_deref().unwrap_or_default()),
        amount,
        date,
        source_url: raw.source_url.trim().to_string(),
    };
    assign_keys(&mut tx);
    Ok(tx)
}

/// Fills the comparison keys from the display fields.
pub fn assign_keys(tx: &mut NormalizedTransaction) {
    tx.donor_key = name_key(&tx.donor_name);
    tx.employer_key = label_key(&tx.donor_employer);
    tx.recipient_key = match &tx.recipient_id {
        Some(id) => id.clone(),
        None => label_key(&tx.recipient_name),
    };
}

/// Normalizes a whole collection, collecting rejections instead of failing.
pub fn normalize_batch(
    set: RecordSet,
    raws: &[RawTransaction],
) -> (Vec<NormalizedTransaction>, Vec<Rejection>) {
    let mut kept = Vec::with_capacity(raws.len());
    let mut rejections = Vec::new();

    for (position, raw) in raws.iter().enumerate() {
        let index = raw.source_index.unwrap_or(position);
        match normalize(raw) {
            Ok(tx) => kept.push(tx),
            Err(reason) => {
                tracing::warn!(
                    "Rejected {} record #{} ({}): {}",
                    set,
                    index,
                    raw.transaction_id.as_deref().unwrap_or("no id"),
                    reason
                );
                rejections.push(Rejection {
                    set,
                    index,
                    transaction_id: raw.transaction_id.clone(),
                    reason,
                });
            }
        }
    }

    (kept, rejections)
}
