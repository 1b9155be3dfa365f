//! Month-bucketed (donor, recipient) summaries.
//!
//! Pure and cheap: recomputed from the stored transaction list every time
//! something is displayed, never persisted.

use crate::core::refund::split_refunds;
use crate::domain::model::{MonthKey, MonthSummary, NormalizedTransaction, SummaryGroup};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which name form identifies a (donor, recipient) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SummaryKey {
    /// Exact display names. Case variants of one name stay separate rows.
    #[default]
    Display,
    /// Comparison keys from the normalizer, merging case and word-order variants.
    Canonical,
}

impl SummaryKey {
    fn pair(self, tx: &NormalizedTransaction) -> (String, String) {
        match self {
            SummaryKey::Display => (tx.donor_name.clone(), tx.recipient_name.clone()),
            SummaryKey::Canonical => (tx.donor_key.clone(), tx.recipient_key.clone()),
        }
    }
}

pub fn month_key(date: NaiveDate) -> MonthKey {
    MonthKey {
        year: date.year(),
        month: date.month(),
    }
}

/// `Jan 5` for a single day, `Jan 5–Jan 20` otherwise.
pub fn format_date_range(min: NaiveDate, max: NaiveDate) -> String {
    if min == max {
        min.format("%b %-d").to_string()
    } else {
        format!("{}–{}", min.format("%b %-d"), max.format("%b %-d"))
    }
}

/// Buckets by calendar month (oldest first) and aggregates each (donor, recipient) pair.
///
/// Inside a month, groups are ordered by contributed amount, largest first,
/// with ties kept in order of first appearance.
pub fn summarize(transactions: &[NormalizedTransaction], key: SummaryKey) -> Vec<MonthSummary> {
    let mut months: BTreeMap<MonthKey, Vec<Vec<NormalizedTransaction>>> = BTreeMap::new();
    let mut slots: HashMap<(MonthKey, (String, String)), usize> = HashMap::new();

    for tx in transactions {
        let month = month_key(tx.date);
        let buckets = months.entry(month).or_default();
        let slot = *slots.entry((month, key.pair(tx))).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(tx.clone());
    }

    months
        .into_iter()
        .map(|(month, buckets)| {
            let mut groups: Vec<SummaryGroup> = buckets.into_iter().map(summarize_group).collect();
            groups.sort_by(|a, b| b.positive_amount.cmp(&a.positive_amount));
            MonthSummary { month, groups }
        })
        .collect()
}

fn summarize_group(contributions: Vec<NormalizedTransaction>) -> SummaryGroup {
    let first = &contributions[0];
    let donor_name = first.donor_name.clone();
    let recipient_name = first.recipient_name.clone();
    let recipient_party = first.recipient_party.clone();

    let min = contributions.iter().map(|tx| tx.date).min().unwrap_or(first.date);
    let max = contributions.iter().map(|tx| tx.date).max().unwrap_or(first.date);

    let split = split_refunds(contributions.iter().cloned());

    SummaryGroup {
        donor_name,
        recipient_name,
        recipient_party,
        positive_amount: split.contributed(),
        negative_amount: split.returned(),
        date_range: format_date_range(min, max),
        contribution_count: contributions.len(),
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::assign_keys;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn pac(id: &str, donor: &str, recipient: &str, date: &str, amount: Decimal) -> NormalizedTransaction {
        let mut tx = NormalizedTransaction {
            transaction_id: id.to_string(),
            donor_name: donor.to_string(),
            donor_key: String::new(),
            donor_employer: String::new(),
            employer_key: String::new(),
            donor_info: String::new(),
            recipient_name: recipient.to_string(),
            recipient_id: None,
            recipient_key: String::new(),
            recipient_party: "DEMOCRATIC PARTY".to_string(),
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            source_url: String::new(),
        };
        assign_keys(&mut tx);
        tx
    }

    #[test]
    fn test_month_bucketing() {
        let txs = vec![
            pac("3", "NETPAC", "Carter", "2025-02-01", dec!(10)),
            pac("1", "NETPAC", "Carter", "2025-01-31", dec!(10)),
            pac("2", "NETPAC", "Carter", "2025-01-01", dec!(10)),
        ];
        let months = summarize(&txs, SummaryKey::Display);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month.to_string(), "2025-01");
        assert_eq!(months[0].groups.len(), 1);
        assert_eq!(months[0].groups[0].contribution_count, 2);
        assert_eq!(months[0].groups[0].date_range, "Jan 1–Jan 31");
        assert_eq!(months[1].month.to_string(), "2025-02");
        assert_eq!(months[1].groups[0].date_range, "Feb 1");
    }

    #[test]
    fn test_refund_and_contribution_in_one_group() {
        let txs = vec![
            pac("1", "NETPAC", "Carter", "2025-08-29", dec!(-500)),
            pac("2", "NETPAC", "Carter", "2025-08-30", dec!(500)),
        ];
        let months = summarize(&txs, SummaryKey::Display);
        assert_eq!(months.len(), 1);
        let group = &months[0].groups[0];
        assert_eq!(group.positive_amount, dec!(500));
        assert_eq!(group.negative_amount, dec!(500));
        assert_eq!(group.contribution_count, 2);
        assert_eq!(group.contributions.len(), 2);
    }

    #[test]
    fn test_refunds_never_counted_as_positive() {
        let txs = vec![
            pac("1", "NETPAC", "Carter", "2025-03-01", dec!(-250)),
            pac("2", "NETPAC", "Carter", "2025-03-02", dec!(-100)),
        ];
        let group = &summarize(&txs, SummaryKey::Display)[0].groups[0];
        assert_eq!(group.positive_amount, dec!(0));
        assert_eq!(group.negative_amount, dec!(350));
    }

    #[test]
    fn test_display_key_keeps_case_variants_apart() {
        let txs = vec![
            pac("1", "NetPAC", "Carter", "2025-03-01", dec!(100)),
            pac("2", "NETPAC", "Carter", "2025-03-02", dec!(300)),
        ];
        let display = summarize(&txs, SummaryKey::Display);
        assert_eq!(display[0].groups.len(), 2);
        assert_eq!(display[0].groups[0].donor_name, "NETPAC");

        let canonical = summarize(&txs, SummaryKey::Canonical);
        assert_eq!(canonical[0].groups.len(), 1);
        assert_eq!(canonical[0].groups[0].positive_amount, dec!(400));
        assert_eq!(canonical[0].groups[0].donor_name, "NetPAC");
    }

    #[test]
    fn test_distinct_recipients_are_separate_groups() {
        let txs = vec![
            pac("1", "NETPAC", "Carter", "2025-03-01", dec!(100)),
            pac("2", "NETPAC", "Adams", "2025-03-02", dec!(300)),
        ];
        let groups = &summarize(&txs, SummaryKey::Display)[0].groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].recipient_name, "Adams");
    }

    #[test]
    fn test_empty_input() {
        assert!(summarize(&[], SummaryKey::Display).is_empty());
    }
}
