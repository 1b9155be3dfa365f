// Adapters layer: upstream record shapes mapped onto the flat domain record.

pub mod fec;

use crate::domain::model::{scalar_text, RawSet, RawTransaction, RecordSet, RejectReason, Rejection};
use crate::utils::error::{EtlError, Result};
use fec::{ScheduleAReceipt, ScheduleBDisbursement};
use serde::{Deserialize, Serialize};

/// Shape of the files written by the fetch step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Raw FEC API results: Schedule A receipts and Schedule B disbursements.
    #[default]
    Fec,
    /// Already-flat `RawTransaction` JSON.
    Flat,
}

/// Parses one input file. The top level must be a JSON array; entries that
/// do not fit the record shape become `unreadable-entry` rejections, not fatal.
pub fn parse_records(set: RecordSet, format: InputFormat, data: &[u8]) -> Result<RawSet> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(EtlError::ProcessingError {
            message: format!("{} input must be a JSON array of records", set),
        });
    };

    let mut parsed = RawSet::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let transaction_id = ["transactionId", "transaction_id"]
            .iter()
            .find_map(|field| entry.get(*field))
            .cloned()
            .and_then(scalar_text);
        let record = match (format, set) {
            (InputFormat::Flat, _) => serde_json::from_value::<RawTransaction>(entry).map(Some),
            (InputFormat::Fec, RecordSet::Individual) => {
                serde_json::from_value::<ScheduleAReceipt>(entry).map(|r| Some(r.into()))
            }
            (InputFormat::Fec, RecordSet::Pac) => {
                serde_json::from_value::<ScheduleBDisbursement>(entry).map(|d| d.into_raw())
            }
        };

        match record {
            Ok(Some(mut raw)) => {
                raw.source_index = Some(index);
                parsed.records.push(raw);
            }
            Ok(None) => parsed.non_contributions += 1,
            Err(e) => {
                tracing::warn!("Rejected unreadable {} entry #{}: {}", set, index, e);
                parsed.unreadable.push(Rejection {
                    set,
                    index,
                    transaction_id,
                    reason: RejectReason::UnreadableEntry {
                        detail: e.to_string(),
                    },
                });
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_records() {
        let data = br#"[
            {"donorName": "Jane Doe", "donorEmployer": null, "amount": "100", "date": "2025-01-01", "transactionId": "T1", "fecUrl": "u"},
            {"donorName": null, "transactionId": "T2"},
            "not a record"
        ]"#;
        let parsed = parse_records(RecordSet::Individual, InputFormat::Flat, data).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].source_url, "u");
        assert_eq!(parsed.records[1].donor_name, "");
        assert_eq!(parsed.records[1].source_index, Some(1));
        assert_eq!(parsed.unreadable.len(), 1);
        assert_eq!(parsed.unreadable[0].index, 2);
        assert!(matches!(
            parsed.unreadable[0].reason,
            RejectReason::UnreadableEntry { .. }
        ));
        assert_eq!(parsed.received(), 3);
    }

    #[test]
    fn test_wrongly_typed_scalars_reach_the_normalizer() {
        let data = br#"[
            {"donorName": "NETPAC", "amount": 100, "date": 20250801, "transactionId": 17},
            {"donorName": ["not", "text"], "amount": 100, "date": "2025-08-01", "transactionId": "B"}
        ]"#;
        let parsed = parse_records(RecordSet::Pac, InputFormat::Flat, data).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].date, "20250801");
        assert_eq!(parsed.records[0].transaction_id.as_deref(), Some("17"));
        assert_eq!(parsed.unreadable.len(), 1);
        assert_eq!(parsed.unreadable[0].transaction_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_parse_fec_pac_counts_non_contributions() {
        let data = br#"[
            {"committee": {"name": "NETPAC"}, "recipient_committee": {"name": "Carter"},
             "disbursement_amount": 1000.0, "disbursement_date": "2025-08-29",
             "disbursement_purpose_category": "CONTRIBUTIONS", "transaction_id": "1"},
            {"committee": {"name": "NETPAC"}, "recipient_committee": {"name": "Vendor"},
             "disbursement_amount": 250.0, "disbursement_purpose_category": "OTHER", "transaction_id": "3"}
        ]"#;
        let parsed = parse_records(RecordSet::Pac, InputFormat::Fec, data).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.non_contributions, 1);
        assert_eq!(parsed.received(), 2);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let err = parse_records(RecordSet::Pac, InputFormat::Fec, br#"{"results": []}"#);
        assert!(matches!(err, Err(EtlError::ProcessingError { .. })));
        assert!(parse_records(RecordSet::Pac, InputFormat::Fec, b"not json").is_err());
    }
}
