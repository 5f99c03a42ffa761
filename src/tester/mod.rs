//! The sweep controller — drives a fixed-count sequential polling loop
//! against the prediction service, renders results, and halts at the end.
//!
//! # Execution model
//!
//! Steps are strictly serialized: a tick begins only after the previous
//! step has fully completed, and the controller sleeps for whatever remains
//! of the configured interval after the step's own latency. Exactly one
//! sweep can run at a time, enforced by an explicit state machine rather
//! than by inspecting the sample index.
//!
//! # Failure model
//!
//! Every step error is caught, reported, and the loop continues — no retry
//! policy, no backoff. A failed step never advances the index, so the same
//! sample is retried on the next tick. The only designed stop is the
//! sample-count bound.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;

use crate::client::{Prediction, Predictor};
use crate::config::schema::SweepSection;
use crate::error::StepError;
use crate::gallery::{MissGallery, RecordOutcome};
use crate::render::ChartSurface;

// ---------------------------------------------------------------------------
// States and outcomes
// ---------------------------------------------------------------------------

/// Lifecycle of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// No sweep has started (or the tester was reset).
    Idle,
    /// A sweep is in progress.
    Running,
    /// The index reached the bound; the sweep is done.
    Complete,
}

/// Why a `start` was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejected {
    #[error("a sweep is already running")]
    AlreadyRunning,
    #[error("the sweep is already complete; reset before starting again")]
    AlreadyComplete,
}

/// What happened during one step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The prediction succeeded and the index advanced by one.
    Advanced {
        correct: u64,
        incorrect: u64,
        /// Newly recorded miss id, if this step created a gallery entry.
        new_miss: Option<u64>,
        /// The chart surface was absent; the redraw was skipped.
        chart_skipped: bool,
    },
    /// The step failed; the index did not advance.
    Failed(StepError),
}

impl StepOutcome {
    /// Short machine-readable label used in the JSONL step log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Advanced { .. } => "ok",
            Self::Failed(err) => err.label(),
        }
    }

    pub fn is_advance(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// One step attempt, as handed to the observer and the step log.
#[derive(Debug)]
pub struct StepReport {
    /// Index the step attempted (pre-advance).
    pub index: u64,
    pub latency_ms: u64,
    pub outcome: StepOutcome,
}

/// Result of one guarded loop iteration.
#[derive(Debug)]
pub enum Tick {
    Stepped(StepReport),
    /// The index reached the bound; the sweep just completed.
    Complete,
}

/// Final tallies of a completed sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepSummary {
    pub total_samples: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub failed_steps: u64,
}

// ---------------------------------------------------------------------------
// Sample tester
// ---------------------------------------------------------------------------

/// Stateful sweep controller.
///
/// Owns the sample index, the running guard, and the two side-effect sinks
/// (chart redraw, miss gallery). Generic over the prediction collaborator
/// and the chart surface so tests can script both.
pub struct SampleTester<P: Predictor, C: ChartSurface> {
    predictor: P,
    chart: C,
    gallery: MissGallery,
    total_samples: u64,
    interval: Duration,
    index: u64,
    state: SweepState,
    failed_steps: u64,
    latest: Option<(u64, u64)>,
}

impl<P: Predictor, C: ChartSurface> SampleTester<P, C> {
    pub fn new(predictor: P, chart: C, gallery: MissGallery, sweep: &SweepSection) -> Self {
        Self {
            predictor,
            chart,
            gallery,
            total_samples: sweep.total_samples,
            interval: Duration::from_millis(sweep.interval_ms),
            index: 0,
            state: SweepState::Idle,
            failed_steps: 0,
            latest: None,
        }
    }

    /// Index of the sample the next step will test.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SweepState::Running
    }

    pub fn gallery(&self) -> &MissGallery {
        &self.gallery
    }

    /// Latest `(correct, incorrect)` counts seen from the service.
    pub fn latest_counts(&self) -> Option<(u64, u64)> {
        self.latest
    }

    fn summary(&self) -> SweepSummary {
        let (correct, incorrect) = self.latest.unwrap_or((0, 0));
        SweepSummary {
            total_samples: self.total_samples,
            correct,
            incorrect,
            failed_steps: self.failed_steps,
        }
    }

    /// Transition Idle → Running, refusing a second concurrent start and a
    /// start after completion.
    pub fn begin(&mut self) -> Result<(), StartRejected> {
        match self.state {
            SweepState::Running => return Err(StartRejected::AlreadyRunning),
            SweepState::Complete => return Err(StartRejected::AlreadyComplete),
            SweepState::Idle => {}
        }
        self.state = SweepState::Running;

        // A failed create surfaces per-step as ContainerMissing.
        let _ = self.gallery.ensure_container();

        // Initial zero-count render, before any step has run.
        let (correct, incorrect) = self.latest.unwrap_or((0, 0));
        let _ = self.chart.draw(correct, incorrect);

        Ok(())
    }

    /// One guarded loop iteration: stop at the bound, otherwise step.
    pub fn tick(&mut self) -> Tick {
        if self.index >= self.total_samples {
            self.state = SweepState::Complete;
            return Tick::Complete;
        }
        Tick::Stepped(self.step())
    }

    /// Run the sweep to completion, calling `observe` after every step.
    ///
    /// Refuses to run when a sweep is already running or complete, then
    /// loops until the index reaches the bound.
    pub fn start(&mut self, mut observe: impl FnMut(&StepReport)) -> Result<SweepSummary, StartRejected> {
        self.begin()?;

        loop {
            let tick_started = Instant::now();

            match self.tick() {
                Tick::Complete => return Ok(self.summary()),
                Tick::Stepped(report) => observe(&report),
            }

            // Serialized cadence: sleep only for what remains of the
            // interval after the step's own latency.
            if let Some(rest) = self.interval.checked_sub(tick_started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    /// Return the tester to the not-started state and clear the gallery.
    ///
    /// The service-side counterpart (`POST /reset`) is issued by the CLI;
    /// this resets only local state. Refused while a sweep is running.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(StartRejected::AlreadyRunning.into());
        }
        self.index = 0;
        self.state = SweepState::Idle;
        self.failed_steps = 0;
        self.latest = None;
        self.gallery.clear()
    }

    /// Execute one prediction step at the current index.
    pub fn step(&mut self) -> StepReport {
        let index = self.index;
        let started = Instant::now();
        let outcome = self.step_inner();

        if let StepOutcome::Failed(_) = outcome {
            self.failed_steps += 1;
        }

        StepReport {
            index,
            latency_ms: started.elapsed().as_millis() as u64,
            outcome,
        }
    }

    fn step_inner(&mut self) -> StepOutcome {
        let prediction = match self.predictor.predict(self.index) {
            Ok(p) => p,
            Err(err) => return StepOutcome::Failed(err),
        };

        self.latest = Some((prediction.correct, prediction.incorrect));

        // An absent chart surface degrades to a skipped redraw; the step
        // still completes and advances.
        let chart_skipped = self
            .chart
            .draw(prediction.correct, prediction.incorrect)
            .is_err();

        let new_miss = match self.record_miss(&prediction) {
            Ok(id) => id,
            // A missing container aborts the step before the index
            // advances; the loop retries this sample on the next tick.
            Err(err) => return StepOutcome::Failed(err),
        };

        self.index += 1;

        StepOutcome::Advanced {
            correct: prediction.correct,
            incorrect: prediction.incorrect,
            new_miss,
            chart_skipped,
        }
    }

    /// Record this step's miss in the gallery, if it produced a new one.
    ///
    /// `incorrect` doubles as the id of the newest miss image on the
    /// service, so a count of zero means no miss has ever happened and an
    /// already-recorded id means this step classified correctly.
    fn record_miss(&mut self, prediction: &Prediction) -> Result<Option<u64>, StepError> {
        let id = prediction.incorrect;
        if id == 0 || self.gallery.contains(id) {
            return Ok(None);
        }

        // Best-effort: a failed image fetch keeps the reference entry.
        let image = if self.gallery.wants_download() {
            self.predictor.fetch_miss_image(id).ok()
        } else {
            None
        };

        match self.gallery.record(id, image.as_deref())? {
            RecordOutcome::Recorded => Ok(Some(id)),
            RecordOutcome::AlreadyPresent => Ok(None),
        }
    }
}
