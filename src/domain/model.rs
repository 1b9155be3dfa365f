use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Which upstream collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSet {
    Individual,
    Pac,
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSet::Individual => f.write_str("individual"),
            RecordSet::Pac => f.write_str("pac"),
        }
    }
}

/// Amounts arrive as JSON numbers, numeric strings, or occasionally garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => f.write_str(s),
            RawAmount::Other(v) => write!(f, "{}", v),
        }
    }
}

/// `null` and absent fields both become the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Reads any JSON value as text so a wrongly typed field reaches the
/// normalizer and is rejected there. `null` becomes empty.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_opt_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// A flat transaction record as handed over by the fetch step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    #[serde(deserialize_with = "nullable")]
    pub donor_name: String,
    pub donor_employer: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub donor_info: String,
    #[serde(deserialize_with = "nullable")]
    pub recipient_name: String,
    pub recipient_id: Option<String>,
    pub recipient_party: Option<String>,
    pub amount: Option<RawAmount>,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub transaction_id: Option<String>,
    #[serde(alias = "fecUrl", deserialize_with = "nullable")]
    pub source_url: String,
    /// Position of the entry in its input file, when read from one.
    #[serde(skip)]
    pub source_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub transaction_id: String,
    pub donor_name: String,
    /// Case-folded comparison key; recomputed on load, never serialized.
    #[serde(skip)]
    pub donor_key: String,
    pub donor_employer: String,
    #[serde(skip)]
    pub employer_key: String,
    pub donor_info: String,
    pub recipient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip)]
    pub recipient_key: String,
    pub recipient_party: String,
    /// Currency units; written as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(rename = "fecUrl")]
    pub source_url: String,
}

impl NormalizedTransaction {
    pub fn is_refund(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEvent {
    pub employer: String,
    pub recipient_name: String,
    pub recipient_party: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub donor_count: usize,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub timeframe: String,
    /// Newest first.
    pub contributions: Vec<NormalizedTransaction>,
}

/// Calendar month bucket. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryGroup {
    pub donor_name: String,
    pub recipient_name: String,
    pub recipient_party: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub positive_amount: Decimal,
    /// Absolute value of the refunds in the group.
    #[serde(with = "rust_decimal::serde::float")]
    pub negative_amount: Decimal,
    pub contributions: Vec<NormalizedTransaction>,
    pub date_range: String,
    pub contribution_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub groups: Vec<SummaryGroup>,
}

/// The document handed to the renderer. Both fields are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub cluster_events: Vec<ClusterEvent>,
    pub pac_contributions: Vec<NormalizedTransaction>,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum RejectReason {
    #[error("malformed-date: '{value}' is not a YYYY-MM-DD calendar date")]
    MalformedDate { value: String },

    #[error("malformed-amount: '{value}' is not a number")]
    MalformedAmount { value: String },

    #[error("missing-identifier: record has no transaction id")]
    MissingIdentifier,

    #[error("unreadable-entry: {detail}")]
    UnreadableEntry { detail: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub set: RecordSet,
    /// Position in the set's input file, or in the record slice when
    /// records were handed over directly.
    pub index: usize,
    pub transaction_id: Option<String>,
    #[serde(flatten)]
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetReport {
    /// Every entry of the input, readable or not.
    pub received: usize,
    /// Disbursements that are not contributions; skipped, not rejected.
    pub non_contributions: usize,
    /// All rejections for the set, unreadable entries included.
    pub rejected: usize,
    pub unreadable: usize,
    pub duplicates_removed: usize,
    pub refunds: usize,
    pub zero_amount: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    /// Individual contributions with a blank employer.
    pub missing_employer: usize,
    /// Contributions to the donor's own company PAC.
    pub own_pac_excluded: usize,
    pub groups: usize,
    pub below_threshold: usize,
    pub emitted: usize,
}

/// Diagnostics collected alongside the output of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    pub individual: SetReport,
    pub pac: SetReport,
    pub clustering: ClusterStats,
    pub rejections: Vec<Rejection>,
}

/// One input file after parsing, before any cleanup.
#[derive(Debug, Clone, Default)]
pub struct RawSet {
    pub records: Vec<RawTransaction>,
    /// Entries that were not objects of the expected shape.
    pub unreadable: Vec<Rejection>,
    /// Upstream disbursements that are not contributions to a committee.
    pub non_contributions: usize,
}

impl RawSet {
    pub fn received(&self) -> usize {
        self.records.len() + self.unreadable.len() + self.non_contributions
    }
}

impl From<Vec<RawTransaction>> for RawSet {
    fn from(records: Vec<RawTransaction>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }
}

/// Raw records read by the extract step.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    pub individual: RawSet,
    pub pac: RawSet,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub output: PipelineOutput,
    pub report: TransformReport,
}
