//! Executive cluster detection.
//!
//! Contributions are grouped by (employer, recipient). Inside a group they are
//! chained by date: a contribution joins the running cluster when it falls
//! within `window_days` of the latest date already in it, so membership is the
//! transitive closure of "within window" rather than distance from an anchor.

use crate::domain::model::{ClusterEvent, ClusterStats, NormalizedTransaction};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Clusters below this many distinct donors are not shown by the renderer.
pub const DISPLAY_MIN_DONORS: usize = 3;

/// An employer's own PAC. Contributions to it are routine payroll giving, not a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnPac {
    /// Matched case-insensitively as a substring of the employer.
    pub employer_keyword: String,
    pub committee_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub window_days: u32,
    pub min_donors: usize,
    pub own_pacs: Vec<OwnPac>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_donors: 2,
            own_pacs: Vec::new(),
        }
    }
}

impl ClusterConfig {
    fn is_own_pac(&self, tx: &NormalizedTransaction) -> bool {
        let Some(recipient_id) = tx.recipient_id.as_deref() else {
            return false;
        };
        self.own_pacs.iter().any(|pac| {
            pac.committee_id == recipient_id
                && tx.employer_key.contains(&pac.employer_keyword.to_lowercase())
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterDetection {
    pub events: Vec<ClusterEvent>,
    pub stats: ClusterStats,
}

/// Human label for how tightly the contributions landed.
pub fn timeframe_label(span_days: i64) -> String {
    if span_days > 7 {
        format!("over {} days", span_days)
    } else if span_days > 1 {
        "in the last week".to_string()
    } else {
        "in the last 24 hours".to_string()
    }
}

/// Expects deduplicated, refund-free individual contributions.
pub fn detect_clusters(
    transactions: &[NormalizedTransaction],
    config: &ClusterConfig,
) -> ClusterDetection {
    let mut stats = ClusterStats::default();

    let mut group_index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&NormalizedTransaction>> = Vec::new();
    for tx in transactions {
        if tx.employer_key.is_empty() {
            stats.missing_employer += 1;
            continue;
        }
        if config.is_own_pac(tx) {
            stats.own_pac_excluded += 1;
            continue;
        }
        let key = (tx.employer_key.as_str(), tx.recipient_key.as_str());
        let slot = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(tx);
    }
    stats.groups = groups.len();

    let window = i64::from(config.window_days);
    let mut events = Vec::new();
    for mut group in groups {
        // stable: equal dates keep input order
        group.sort_by_key(|tx| tx.date);

        for members in chain_by_window(&group, window) {
            let donors: HashSet<&str> = members.iter().map(|tx| tx.donor_key.as_str()).collect();
            if donors.len() < config.min_donors {
                stats.below_threshold += 1;
                continue;
            }
            events.push(build_event(&members, donors.len()));
        }
    }

    events.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.window_start.cmp(&b.window_start))
    });
    stats.emitted = events.len();

    tracing::debug!(
        "Cluster detection: {} groups, {} emitted, {} below threshold",
        stats.groups,
        stats.emitted,
        stats.below_threshold
    );

    ClusterDetection { events, stats }
}

/// Splits a date-sorted group wherever the gap to the previous member exceeds the window.
fn chain_by_window<'a>(
    sorted: &[&'a NormalizedTransaction],
    window_days: i64,
) -> Vec<Vec<&'a NormalizedTransaction>> {
    let mut chains: Vec<Vec<&NormalizedTransaction>> = Vec::new();
    for &tx in sorted {
        let joins = chains
            .last()
            .and_then(|current| current.last())
            .is_some_and(|prev| (tx.date - prev.date).num_days() <= window_days);
        match chains.last_mut() {
            Some(current) if joins => current.push(tx),
            _ => chains.push(vec![tx]),
        }
    }
    chains
}

fn build_event(members: &[&NormalizedTransaction], donor_count: usize) -> ClusterEvent {
    let first = members[0];
    let window_start = first.date;
    let window_end = members.last().map_or(window_start, |tx| tx.date);
    let total_amount = members.iter().map(|tx| tx.amount).sum();

    let mut contributions: Vec<NormalizedTransaction> =
        members.iter().map(|tx| (*tx).clone()).collect();
    contributions.sort_by(|a, b| b.date.cmp(&a.date));

    ClusterEvent {
        employer: first.donor_employer.clone(),
        recipient_name: first.recipient_name.clone(),
        recipient_party: first.recipient_party.clone(),
        total_amount,
        donor_count,
        window_start,
        window_end,
        timeframe: timeframe_label((window_end - window_start).num_days()),
        contributions,
    }
}
