//! Resumable sequential ingestion loop
//!
//! `Recovering -> Running -> Stopped`. Each tick generates one reading under
//! the next sequence number, writes it under its deterministic document id
//! and waits one interval. Write failures are logged and counted; the loop
//! moves on to the next tick without retrying.

use std::sync::Arc;
use std::time::Duration;

use agrosense_core::{HealthReport, ReadingGenerator, SessionStats};
use agrosense_store::{DocumentStore, ReadingDocument, StoreError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::recovery::recover;

/// Source of the inter-tick wait
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock timer backed by tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Loop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    /// Looking up the highest stored sequence
    Recovering,
    /// Generating and writing one reading per tick
    Running,
    /// Cancelled or out of sequence numbers
    Stopped,
}

/// Process-local sequence counter, owned by exactly one loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
    current: u64,
}

impl SequenceState {
    /// Counter whose first `advance` yields `recovered + 1`
    pub fn starting_at(recovered: u64) -> Self {
        Self { current: recovered }
    }

    /// Last sequence handed out
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Next sequence; never repeats a value.
    ///
    /// `None` once `u64::MAX` has been handed out. The counter is left at
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Option<u64> {
        let next = self.current.checked_add(1)?;
        self.current = next;
        Some(next)
    }
}

/// Runtime parameters of an ingestion loop
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Stamped on every reading as its producer
    pub source_identifier: String,
    /// Wait between the end of one tick and the start of the next
    pub tick_interval: Duration,
    /// Bound on every store call
    pub store_timeout: Duration,
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Sequence found during recovery
    pub recovered_sequence: u64,
    /// Last sequence handed out before stopping
    pub final_sequence: u64,
    /// Aggregates of the readings generated this run
    pub stats: SessionStats,
    /// Field health summary built from `stats`
    pub health: HealthReport,
}

/// Sequential producer of readings, one per tick, until cancelled
pub struct IngestionLoop<C: Clock = TokioClock> {
    store: Arc<dyn DocumentStore>,
    clock: C,
    generator: ReadingGenerator,
    settings: IngestSettings,
    phase: IngestPhase,
}

impl IngestionLoop<TokioClock> {
    /// Loop that waits on the wall clock
    pub fn new(store: Arc<dyn DocumentStore>, settings: IngestSettings) -> Self {
        Self::with_clock(store, TokioClock, settings)
    }
}

impl<C: Clock> IngestionLoop<C> {
    /// Loop that waits on `clock` between ticks
    pub fn with_clock(store: Arc<dyn DocumentStore>, clock: C, settings: IngestSettings) -> Self {
        Self {
            store,
            clock,
            generator: ReadingGenerator::new(),
            settings,
            phase: IngestPhase::Recovering,
        }
    }

    /// Replace the entropy-seeded generator, e.g. with a seeded one
    pub fn with_generator(mut self, generator: ReadingGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> IngestPhase {
        self.phase
    }

    fn transition(&mut self, next: IngestPhase) {
        info!(from = ?self.phase, to = ?next, "ingestion phase change");
        self.phase = next;
    }

    /// Run until `cancel` fires or the sequence space is exhausted.
    ///
    /// Cancellation is observed at every tick boundary and interrupts the
    /// inter-tick wait. A write already in flight is allowed to finish (it is
    /// bounded by the store timeout).
    pub async fn run(&mut self, cancel: CancellationToken) -> IngestReport {
        self.phase = IngestPhase::Recovering;
        let recovered_sequence = recover(self.store.as_ref(), self.settings.store_timeout).await;
        let mut sequence = SequenceState::starting_at(recovered_sequence);
        let mut stats = SessionStats::new();
        self.transition(IngestPhase::Running);

        while !cancel.is_cancelled() {
            if !self.tick(&mut sequence, &mut stats).await {
                error!(
                    last_sequence = sequence.current(),
                    "sequence space exhausted, stopping ingestion"
                );
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.clock.sleep(self.settings.tick_interval) => {}
            }
        }

        self.transition(IngestPhase::Stopped);
        let health = HealthReport::from_stats(&stats);
        info!(
            final_sequence = sequence.current(),
            readings = stats.readings,
            writes_succeeded = stats.writes_succeeded,
            writes_failed = stats.writes_failed,
            avg_soil = stats.avg_soil_moisture(),
            avg_temp = stats.avg_temperature(),
            total_rain = stats.total_rainfall(),
            avg_plant_health = stats.avg_plant_health(),
            "ingestion stopped"
        );
        info!(
            overall_score = health.overall_score,
            overall_status = ?health.overall_status,
            warning_events = health.warning_events,
            critical_events = health.critical_events,
            "session health"
        );

        IngestReport {
            recovered_sequence,
            final_sequence: sequence.current(),
            stats,
            health,
        }
    }

    /// One generate-and-write step; false when no sequence number is left
    async fn tick(&mut self, sequence: &mut SequenceState, stats: &mut SessionStats) -> bool {
        let Some(seq) = sequence.advance() else {
            return false;
        };
        let reading = self
            .generator
            .generate(seq, &self.settings.source_identifier);
        stats.record_reading(&reading);

        let doc_id = reading.document_id();
        let document = ReadingDocument::from(&reading);
        let timeout = self.settings.store_timeout;

        let outcome = match tokio::time::timeout(timeout, self.store.put(&doc_id, &document)).await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(timeout)),
        };

        match outcome {
            Ok(()) => {
                stats.record_write(true);
                info!(
                    sequence = seq,
                    doc_id = %doc_id,
                    temp = document.temp,
                    soil = document.soil,
                    rain = document.rain,
                    plant_health = document.plant_health,
                    "reading stored"
                );
            }
            Err(e) => {
                stats.record_write(false);
                warn!(sequence = seq, doc_id = %doc_id, error = %e, "write failed, continuing");
            }
        }
        true
    }
}
