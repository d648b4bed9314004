//! Batched bulk load orchestration.
//!
//! Records are projected onto one key set, cut into fixed-size batches in
//! input order and submitted one load call at a time. The first
//! error-tagged message aborts the run; batches already submitted stay
//! applied on the backend.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use odoolink_core::{AppError, AppResult};
use odoolink_domain::{
    CallContext, DEFAULT_BATCH_SIZE, EntityType, LoadMessage, LoadMessageType, LoadPlan, Record,
};
use tracing::{error, info, warn};

use crate::remote_gateway::RemoteGateway;

/// Caller-tunable parameters of one bulk load run.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkLoadOptions {
    /// Keys of the first record left out of the load header.
    pub ignored_fields: Vec<String>,
    /// Maximum records per load call; must be greater than zero.
    pub batch_size: usize,
    /// Offset added to progress counters in logs only. No record is skipped.
    pub skip_offset: usize,
    /// Context laid over the gateway defaults for every batch.
    pub context: Option<CallContext>,
}

impl Default for BulkLoadOptions {
    fn default() -> Self {
        Self {
            ignored_fields: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            skip_offset: 0,
            context: None,
        }
    }
}

/// Timing of one submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTiming {
    /// Zero-based batch number.
    pub index: usize,
    /// Records in the batch.
    pub size: usize,
    /// Wall time of the load call.
    pub elapsed: Duration,
}

impl BatchTiming {
    /// Average wall time per record.
    #[must_use]
    pub fn per_record(&self) -> Duration {
        let size = u32::try_from(self.size).unwrap_or(u32::MAX).max(1);
        self.elapsed / size
    }
}

/// Outcome of a bulk load run that completed without error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkLoadReport {
    /// Target entity type.
    pub entity_type: EntityType,
    /// Records submitted across all batches.
    pub records_processed: usize,
    /// Ids returned by the backend, in batch order.
    pub created_ids: Vec<i64>,
    /// Per-batch timings in submission order.
    pub batches: Vec<BatchTiming>,
    /// Wall time of the whole run.
    pub total_elapsed: Duration,
}

impl BulkLoadReport {
    fn empty(entity_type: &EntityType) -> Self {
        Self {
            entity_type: entity_type.clone(),
            records_processed: 0,
            created_ids: Vec::new(),
            batches: Vec::new(),
            total_elapsed: Duration::ZERO,
        }
    }
}

/// Drives sequential load calls through a [`RemoteGateway`].
#[derive(Clone)]
pub struct BulkLoadOrchestrator {
    gateway: RemoteGateway,
}

impl BulkLoadOrchestrator {
    /// Creates an orchestrator over a gateway.
    #[must_use]
    pub fn new(gateway: RemoteGateway) -> Self {
        Self { gateway }
    }

    /// Loads `records` into `entity_type` in batches of `options.batch_size`.
    ///
    /// An empty input is a no-op. Returns `AppError::Load` carrying the
    /// backend text of the first error-tagged message; later batches are not
    /// submitted.
    pub async fn bulk_load(
        &self,
        entity_type: &EntityType,
        records: &[Record],
        options: &BulkLoadOptions,
    ) -> AppResult<BulkLoadReport> {
        if records.is_empty() {
            return Ok(BulkLoadReport::empty(entity_type));
        }

        let batch_size = NonZeroUsize::new(options.batch_size).ok_or_else(|| {
            AppError::Validation("bulk load batch size must be greater than zero".to_owned())
        })?;

        let started_at = Instant::now();
        let plan = LoadPlan::prepare(records, &options.ignored_fields, batch_size)?;
        for field in plan.absent_ignored_fields() {
            warn!(
                entity_type = %entity_type,
                field = %field,
                "ignored field not found in record keys"
            );
        }

        let total = options.skip_offset.saturating_add(plan.record_count());
        let mut report = BulkLoadReport::empty(entity_type);

        for batch in plan.batches() {
            let from = options.skip_offset.saturating_add(batch.offset());
            info!(
                entity_type = %entity_type,
                batch = batch.index(),
                from,
                to = from.saturating_add(batch.len()),
                total,
                "loading batch"
            );

            let batch_started_at = Instant::now();
            let result = self
                .gateway
                .load(
                    entity_type,
                    plan.key_set(),
                    batch.rows(),
                    options.context.as_ref(),
                )
                .await?;

            for message in &result.messages {
                log_load_message(entity_type, batch.index(), message);
            }
            if let Some(message) = result.first_error() {
                return Err(AppError::Load(message.text().to_owned()));
            }

            let timing = BatchTiming {
                index: batch.index(),
                size: batch.len(),
                elapsed: batch_started_at.elapsed(),
            };
            info!(
                entity_type = %entity_type,
                batch = timing.index,
                elapsed_ms = timing.elapsed.as_millis(),
                per_record_ms = timing.per_record().as_secs_f64() * 1000.0,
                "batch loaded"
            );

            report.records_processed += batch.len();
            report.created_ids.extend(result.ids);
            report.batches.push(timing);
        }

        report.total_elapsed = started_at.elapsed();
        info!(
            entity_type = %entity_type,
            records = report.records_processed,
            batches = report.batches.len(),
            elapsed_ms = report.total_elapsed.as_millis(),
            "bulk load finished"
        );

        Ok(report)
    }
}

fn log_load_message(entity_type: &EntityType, batch: usize, message: &LoadMessage) {
    let record = message.record;
    let field = message.field.as_deref().unwrap_or_default();
    match message.message_type {
        LoadMessageType::Error => error!(
            entity_type = %entity_type,
            batch,
            record,
            field,
            message = message.text(),
            "load error"
        ),
        LoadMessageType::Warning => warn!(
            entity_type = %entity_type,
            batch,
            record,
            field,
            message = message.text(),
            "load warning"
        ),
        LoadMessageType::Info => info!(
            entity_type = %entity_type,
            batch,
            record,
            field,
            message = message.text(),
            "load message"
        ),
    }
}
