//! Sequences the pure stages over both record sets.

use crate::core::cluster::{detect_clusters, ClusterConfig};
use crate::core::dedup::deduplicate;
use crate::core::normalizer::{assign_keys, normalize_batch};
use crate::core::refund::{filter_refunds, RefundMode};
use crate::domain::model::{
    NormalizedTransaction, PipelineOutput, RawBatch, RawSet, RawTransaction, RecordSet, SetReport,
    TransformReport, TransformResult,
};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    pub clustering: ClusterConfig,
    /// Clustering always excludes refunds; this only governs the PAC set.
    pub pac_refunds: RefundMode,
}

struct Cleaned {
    transactions: Vec<NormalizedTransaction>,
    report: SetReport,
}

fn clean(
    set: RecordSet,
    raw: &RawSet,
    refunds: RefundMode,
    report: &mut TransformReport,
) -> Cleaned {
    let (normalized, mut rejections) = normalize_batch(set, &raw.records);
    rejections.extend(raw.unreadable.iter().cloned());
    // input order
    rejections.sort_by_key(|rejection| rejection.index);
    let rejected = rejections.len();
    report.rejections.extend(rejections);

    // Duplicates must go before anything counts or sums.
    let deduplicated = deduplicate(normalized);
    let filtered = filter_refunds(deduplicated.transactions, refunds);

    Cleaned {
        report: SetReport {
            received: raw.received(),
            non_contributions: raw.non_contributions,
            rejected,
            unreadable: raw.unreadable.len(),
            duplicates_removed: deduplicated.removed,
            refunds: filtered.refunds,
            zero_amount: filtered.zero_amount,
            kept: filtered.transactions.len(),
        },
        transactions: filtered.transactions,
    }
}

/// One full run over records handed over directly.
pub fn run_transform(
    individuals: &[RawTransaction],
    pacs: &[RawTransaction],
    options: &TransformOptions,
) -> TransformResult {
    let batch = RawBatch {
        individual: RawSet::from(individuals.to_vec()),
        pac: RawSet::from(pacs.to_vec()),
    };
    transform_batch(&batch, options)
}

/// One full run. Never fails: bad records become diagnostics in the report.
pub fn transform_batch(batch: &RawBatch, options: &TransformOptions) -> TransformResult {
    let mut report = TransformReport::default();

    let individual = clean(
        RecordSet::Individual,
        &batch.individual,
        RefundMode::Exclude,
        &mut report,
    );
    report.individual = individual.report;
    let detection = detect_clusters(&individual.transactions, &options.clustering);
    report.clustering = detection.stats;

    let pac = clean(RecordSet::Pac, &batch.pac, options.pac_refunds, &mut report);
    report.pac = pac.report;
    let mut pac_contributions = pac.transactions;
    pac_contributions.sort_by(|a, b| b.date.cmp(&a.date));

    TransformResult {
        output: PipelineOutput {
            cluster_events: detection.events,
            pac_contributions,
        },
        report,
    }
}

/// Reads a previously written output document, restoring comparison keys.
pub fn read_output(data: &[u8]) -> Result<PipelineOutput> {
    let mut output: PipelineOutput = serde_json::from_slice(data)?;
    for tx in output
        .cluster_events
        .iter_mut()
        .flat_map(|event| event.contributions.iter_mut())
        .chain(output.pac_contributions.iter_mut())
    {
        assign_keys(tx);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawAmount, RejectReason};
    use rust_decimal_macros::dec;

    fn individual(id: &str, donor: &str, date: &str, amount: f64) -> RawTransaction {
        RawTransaction {
            donor_name: donor.to_string(),
            donor_employer: Some("Acme Corp".to_string()),
            donor_info: "Acme Corp, EXECUTIVE".to_string(),
            recipient_name: "Senator X".to_string(),
            recipient_party: Some("INDEPENDENT".to_string()),
            amount: Some(RawAmount::Number(amount)),
            date: date.to_string(),
            transaction_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn pac(id: &str, date: &str, amount: f64) -> RawTransaction {
        RawTransaction {
            donor_name: "GOOGLE LLC NETPAC".to_string(),
            recipient_name: "TROY CARTER FOR CONGRESS".to_string(),
            recipient_party: Some("DEMOCRATIC PARTY".to_string()),
            amount: Some(RawAmount::Number(amount)),
            date: date.to_string(),
            transaction_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn options(min_donors: usize) -> TransformOptions {
        TransformOptions {
            clustering: ClusterConfig {
                window_days: 30,
                min_donors,
                own_pacs: Vec::new(),
            },
            pac_refunds: RefundMode::Track,
        }
    }

    #[test]
    fn test_duplicate_does_not_inflate_cluster() {
        let individuals = vec![
            individual("J1", "Jane Doe", "2025-01-02", 100.0),
            individual("R1", "John Roe", "2025-01-10", 200.0),
            individual("L1", "Amy Lee", "2025-01-20", 600.0),
            individual("J1", "Jane Doe", "2025-01-02", 100.0),
        ];
        let result = run_transform(&individuals, &[], &options(3));

        assert_eq!(result.report.individual.duplicates_removed, 1);
        assert_eq!(result.output.cluster_events.len(), 1);
        let event = &result.output.cluster_events[0];
        assert_eq!(event.donor_count, 3);
        assert_eq!(event.total_amount, dec!(900));
        assert_eq!(event.contributions.len(), 3);
    }

    #[test]
    fn test_refunds_excluded_from_clusters_but_kept_for_pacs() {
        let individuals = vec![
            individual("1", "Jane Doe", "2025-01-02", 100.0),
            individual("2", "John Roe", "2025-01-03", -100.0),
        ];
        let pacs = vec![pac("P1", "2025-08-29", 500.0), pac("P2", "2025-08-30", -500.0)];
        let result = run_transform(&individuals, &pacs, &options(2));

        assert!(result.output.cluster_events.is_empty());
        assert_eq!(result.report.individual.refunds, 1);
        assert_eq!(result.output.pac_contributions.len(), 2);
        // newest first
        assert_eq!(result.output.pac_contributions[0].transaction_id, "P2");
    }

    #[test]
    fn test_exclude_mode_for_pacs() {
        let pacs = vec![pac("P1", "2025-08-29", 500.0), pac("P2", "2025-08-30", -500.0)];
        let opts = TransformOptions {
            pac_refunds: RefundMode::Exclude,
            ..options(2)
        };
        let result = run_transform(&[], &pacs, &opts);
        assert_eq!(result.output.pac_contributions.len(), 1);
        assert_eq!(result.report.pac.refunds, 1);
    }

    #[test]
    fn test_bad_records_become_diagnostics() {
        let mut bad_date = pac("P1", "08/29/2025", 500.0);
        bad_date.date = "08/29/2025".to_string();
        let mut no_id = pac("", "2025-08-29", 1.0);
        no_id.transaction_id = None;
        let pacs = vec![bad_date, no_id, pac("P3", "2025-08-29", 10.0)];

        let result = run_transform(&[], &pacs, &options(2));
        assert_eq!(result.report.pac.received, 3);
        assert_eq!(result.report.pac.rejected, 2);
        assert_eq!(result.report.pac.kept, 1);
        assert_eq!(result.report.rejections.len(), 2);
        assert!(matches!(
            result.report.rejections[0].reason,
            RejectReason::MalformedDate { .. }
        ));
        assert_eq!(result.report.rejections[1].reason, RejectReason::MissingIdentifier);
    }

    #[test]
    fn test_empty_batch_yields_empty_output() {
        let result = run_transform(&[], &[], &TransformOptions::default());
        assert!(result.output.cluster_events.is_empty());
        assert!(result.output.pac_contributions.is_empty());

        let json = serde_json::to_value(&result.output).unwrap();
        assert_eq!(json, serde_json::json!({"clusterEvents": [], "pacContributions": []}));
    }

    #[test]
    fn test_read_output_restores_keys() {
        let pacs = vec![pac("P1", "2025-08-29", 500.0)];
        let result = run_transform(&[], &pacs, &options(2));
        let bytes = serde_json::to_vec(&result.output).unwrap();

        let restored = read_output(&bytes).unwrap();
        assert_eq!(restored, result.output);
        assert_eq!(restored.pac_contributions[0].donor_key, "google llc netpac");
    }
}
