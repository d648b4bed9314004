//! Bulk load data model.
//!
//! A load run projects caller records onto one ordered key set, cuts the
//! projected rows into fixed-size batches in input order and interprets the
//! per-batch results returned by the backend.

use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

use odoolink_core::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One unit to be loaded: field name to value, in insertion order.
pub type Record = Map<String, Value>;

/// Default number of records per load call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Ordered field names sent as the header of every load call of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoadKeySet(Vec<String>);

impl LoadKeySet {
    /// Derives the key set from the first record, dropping ignored fields.
    ///
    /// Returns the key set and the ignored names that were not present in the
    /// record.
    #[must_use]
    pub fn derive(first_record: &Record, ignored_fields: &[String]) -> (Self, Vec<String>) {
        let absent = ignored_fields
            .iter()
            .filter(|field| !first_record.contains_key(field.as_str()))
            .cloned()
            .collect();
        let keys = first_record
            .keys()
            .filter(|key| !ignored_fields.contains(key))
            .cloned()
            .collect();

        (Self(keys), absent)
    }

    /// Returns the field names in order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no field survived the ignore list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Projects a record onto the key set, values only, in key order.
    pub fn project(&self, position: usize, record: &Record) -> AppResult<Vec<Value>> {
        self.0
            .iter()
            .map(|field| {
                record.get(field).cloned().ok_or_else(|| {
                    AppError::Validation(format!(
                        "record {position} has no value for load field '{field}'"
                    ))
                })
            })
            .collect()
    }
}

/// Consecutive slice of projected rows submitted in one load call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    index: usize,
    offset: usize,
    rows: Vec<Vec<Value>>,
}

impl LoadBatch {
    /// Zero-based batch number.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position of the first row in the input sequence.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Positional value rows aligned to the key set.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the batch carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Key set and batches prepared for one load run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    key_set: LoadKeySet,
    batches: Vec<LoadBatch>,
    absent_ignored_fields: Vec<String>,
    record_count: usize,
}

impl LoadPlan {
    /// Projects every record and partitions the rows into batches.
    ///
    /// Batch boundaries depend only on input order and `batch_size`. Every
    /// record is projected before the plan is returned, so a record missing a
    /// key fails here rather than halfway through a run.
    pub fn prepare(
        records: &[Record],
        ignored_fields: &[String],
        batch_size: NonZeroUsize,
    ) -> AppResult<Self> {
        let Some(first_record) = records.first() else {
            return Ok(Self {
                key_set: LoadKeySet(Vec::new()),
                batches: Vec::new(),
                absent_ignored_fields: Vec::new(),
                record_count: 0,
            });
        };

        let (key_set, absent_ignored_fields) = LoadKeySet::derive(first_record, ignored_fields);
        let batches = records
            .chunks(batch_size.get())
            .enumerate()
            .map(|(index, chunk)| {
                let offset = index * batch_size.get();
                let rows = chunk
                    .iter()
                    .enumerate()
                    .map(|(position, record)| key_set.project(offset + position, record))
                    .collect::<AppResult<Vec<_>>>()?;

                Ok(LoadBatch {
                    index,
                    offset,
                    rows,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            key_set,
            batches,
            absent_ignored_fields,
            record_count: records.len(),
        })
    }

    /// Returns the key set shared by every batch.
    #[must_use]
    pub fn key_set(&self) -> &LoadKeySet {
        &self.key_set
    }

    /// Returns the batches in submission order.
    #[must_use]
    pub fn batches(&self) -> &[LoadBatch] {
        &self.batches
    }

    /// Ignored field names that the first record did not contain.
    #[must_use]
    pub fn absent_ignored_fields(&self) -> &[String] {
        &self.absent_ignored_fields
    }

    /// Total number of input records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

/// Severity tag of a load message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMessageType {
    /// Informational, never affects control flow.
    Info,
    /// Suspicious input the backend accepted.
    Warning,
    /// Rejected input; aborts a bulk load.
    Error,
}

impl LoadMessageType {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl Display for LoadMessageType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Inclusive row range a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMessageRows {
    /// First row.
    pub from: i64,
    /// Last row.
    pub to: i64,
}

/// Diagnostic entry attached to a load result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMessage {
    /// Severity.
    #[serde(rename = "type")]
    pub message_type: LoadMessageType,
    /// Index of the offending record within the batch.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub record: Option<i64>,
    /// Field the message is about.
    #[serde(default, deserialize_with = "lenient_string")]
    pub field: Option<String>,
    /// Row range the message is about.
    #[serde(default)]
    pub rows: Option<LoadMessageRows>,
    /// Backend diagnostic text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl LoadMessage {
    /// Returns the text, or an empty string when the backend sent none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Outcome of one load call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    /// Identifiers created or updated by the call; empty when the backend
    /// answered `false`.
    #[serde(default, deserialize_with = "lenient_ids")]
    pub ids: Vec<i64>,
    /// Diagnostics in backend order.
    #[serde(default)]
    pub messages: Vec<LoadMessage>,
}

impl LoadResult {
    /// Returns the first error-tagged message.
    #[must_use]
    pub fn first_error(&self) -> Option<&LoadMessage> {
        self.messages
            .iter()
            .find(|message| message.message_type == LoadMessageType::Error)
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| value.as_i64()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| value.as_str().map(ToOwned::to_owned)))
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_i64).collect(),
        _ => Vec::new(),
    })
}
