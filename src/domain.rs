//! Load schedule and result types
//!
//! A run is an ordered [`Schedule`] of [`Phase`]s. Each worker in a phase folds
//! its [`RequestOutcome`]s into a [`WorkerResult`]; the worker results of one
//! phase are summed into [`PhaseStats`].

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::time::Duration;

/// One step of a schedule: run `concurrency` workers for `duration`.
///
/// A phase with zero concurrency is a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub concurrency: usize,
    pub duration: Duration,
}

impl Phase {
    pub const fn new(concurrency: usize, secs: u64) -> Self {
        Self {
            concurrency,
            duration: Duration::from_secs(secs),
        }
    }

    pub const fn pause(secs: u64) -> Self {
        Self::new(0, secs)
    }

    pub const fn with_duration(concurrency: usize, duration: Duration) -> Self {
        Self {
            concurrency,
            duration,
        }
    }

    pub fn is_pause(&self) -> bool {
        self.concurrency == 0
    }

    /// The progress line printed before the phase starts.
    pub fn announcement(&self) -> String {
        format!(
            "Running {} workers for {} seconds...",
            self.concurrency,
            DisplaySeconds(self.duration)
        )
    }
}

/// Whole seconds print as integers, anything finer as fractional seconds.
struct DisplaySeconds(Duration);

impl fmt::Display for DisplaySeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.subsec_nanos() == 0 {
            write!(f, "{}", self.0.as_secs())
        } else {
            write!(f, "{}", self.0.as_secs_f64())
        }
    }
}

/// Ordered list of phases, consumed once in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule(Vec<Phase>);

impl Schedule {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self(phases)
    }

    /// Two thousand-worker bursts separated by one-second pauses, so that new
    /// connections are requested while the proxy is still releasing the
    /// previous burst's connections.
    pub fn release_collision() -> Self {
        Self(vec![
            Phase::new(1000, 1),
            Phase::pause(1),
            Phase::new(1000, 1),
            Phase::pause(1),
        ])
    }

    /// Single worker and hundred-worker phases alternating, starting and
    /// ending on the single worker.
    pub fn seesaw() -> Self {
        let mut phases = Vec::with_capacity(9);
        for _ in 0..4 {
            phases.push(Phase::new(1, 5));
            phases.push(Phase::new(100, 3));
        }
        phases.push(Phase::new(1, 5));
        Self(phases)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.0
    }

    /// Sum of all phase durations; the lower bound on a full run's wall time.
    pub fn nominal_duration(&self) -> Duration {
        self.0.iter().map(|p| p.duration).sum()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self(vec![
            Phase::new(100, 5),
            Phase::new(1, 3),
            Phase::new(100, 5),
            Phase::new(1, 3),
        ])
    }
}

/// Result of a single GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Full body received; the status code is irrelevant.
    Received { bytes: u64 },
    Failed,
}

/// Counters accumulated by one worker over one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerResult {
    pub requests: u64,
    pub bytes: u64,
    pub errors: u64,
}

impl WorkerResult {
    pub fn record(&mut self, outcome: RequestOutcome) {
        self.requests += 1;
        match outcome {
            RequestOutcome::Received { bytes } => self.bytes += bytes,
            RequestOutcome::Failed => self.errors += 1,
        }
    }

    pub fn successes(&self) -> u64 {
        self.requests - self.errors
    }
}

impl FromIterator<RequestOutcome> for WorkerResult {
    fn from_iter<I: IntoIterator<Item = RequestOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut acc, outcome| {
            acc.record(outcome);
            acc
        })
    }
}

impl Add for WorkerResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            requests: self.requests + rhs.requests,
            bytes: self.bytes + rhs.bytes,
            errors: self.errors + rhs.errors,
        }
    }
}

impl AddAssign for WorkerResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for WorkerResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Totals for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub totals: WorkerResult,
    pub elapsed: Duration,
}

impl PhaseStats {
    pub fn requests(&self) -> u64 {
        self.totals.requests
    }

    pub fn bytes(&self) -> u64 {
        self.totals.bytes
    }

    pub fn errors(&self) -> u64 {
        self.totals.errors
    }

    pub fn is_empty(&self) -> bool {
        self.totals == WorkerResult::default()
    }

    /// Completed requests per second of measured wall time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.totals.requests as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for PhaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Results: {} requests, {} bytes received, {} errors",
            self.totals.requests, self.totals.bytes, self.totals.errors
        )
    }
}
