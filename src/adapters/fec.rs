//! FEC API record shapes, as saved by the fetch step.
//!
//! Schedule A: itemized receipts from individuals.
//! Schedule B: disbursements made by a committee (here, corporate PACs).

use crate::domain::model::{lenient_opt_text, lenient_text, nullable, RawAmount, RawTransaction};
use serde::Deserialize;

pub const CONTRIBUTIONS_CATEGORY: &str = "CONTRIBUTIONS";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitteeRef {
    pub committee_id: Option<String>,
    pub name: Option<String>,
    pub party_full: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleAReceipt {
    pub contributor_name: Option<String>,
    pub contributor_employer: Option<String>,
    pub contributor_occupation: Option<String>,
    pub contribution_receipt_amount: Option<RawAmount>,
    #[serde(deserialize_with = "lenient_text")]
    pub contribution_receipt_date: String,
    pub committee_id: Option<String>,
    pub committee: Option<CommitteeRef>,
    #[serde(deserialize_with = "nullable")]
    pub pdf_url: String,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub transaction_id: Option<String>,
}

impl From<ScheduleAReceipt> for RawTransaction {
    fn from(receipt: ScheduleAReceipt) -> Self {
        let committee = receipt.committee.unwrap_or_default();
        let employer = receipt.contributor_employer.unwrap_or_default();
        let occupation = receipt
            .contributor_occupation
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        RawTransaction {
            donor_name: receipt.contributor_name.unwrap_or_default(),
            donor_info: format!("{}, {}", employer, occupation),
            donor_employer: Some(employer),
            recipient_name: committee
                .name
                .unwrap_or_else(|| "Unknown Committee".to_string()),
            recipient_id: receipt.committee_id.or(committee.committee_id),
            recipient_party: committee.party_full,
            amount: receipt.contribution_receipt_amount,
            date: receipt.contribution_receipt_date,
            transaction_id: receipt.transaction_id,
            source_url: receipt.pdf_url,
            source_index: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleBDisbursement {
    pub committee: Option<CommitteeRef>,
    pub recipient_committee: Option<CommitteeRef>,
    pub disbursement_amount: Option<RawAmount>,
    #[serde(deserialize_with = "lenient_text")]
    pub disbursement_date: String,
    pub disbursement_purpose_category: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub pdf_url: String,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub transaction_id: Option<String>,
}

impl ScheduleBDisbursement {
    /// Only contributions to another committee count; vendor payments and the like do not.
    pub fn is_contribution(&self) -> bool {
        self.recipient_committee.is_some()
            && self.disbursement_purpose_category.as_deref() == Some(CONTRIBUTIONS_CATEGORY)
    }

    pub fn into_raw(self) -> Option<RawTransaction> {
        if !self.is_contribution() {
            return None;
        }
        let recipient = self.recipient_committee.unwrap_or_default();
        let donor = self.committee.unwrap_or_default();

        Some(RawTransaction {
            donor_name: donor.name.unwrap_or_default(),
            donor_employer: None,
            donor_info: String::new(),
            recipient_name: recipient.name.unwrap_or_default(),
            recipient_id: recipient.committee_id,
            recipient_party: recipient.party_full,
            amount: self.disbursement_amount,
            date: self.disbursement_date,
            transaction_id: self.transaction_id,
            source_url: self.pdf_url,
            source_index: None,
        })
    }
}
