//! Phased load driver
//!
//! Phases run strictly one after another. A pause phase only sleeps. An active
//! phase opens one session, spawns `concurrency` workers that share it, and
//! waits for every worker before the next phase begins. Workers stop issuing
//! requests once the deadline has passed but always finish the request they
//! are awaiting, so a phase may overrun its nominal duration.

use rand::Rng;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::client::{Connector, Fetcher};
use crate::domain::{Phase, PhaseStats, WorkerResult};
use crate::error::{Result, StressError};

pub struct LoadDriver {
    connector: Arc<dyn Connector>,
    targets: Arc<[String]>,
}

impl LoadDriver {
    pub fn new(connector: Arc<dyn Connector>, targets: Vec<String>) -> Result<Self> {
        if targets.is_empty() {
            return Err(StressError::NoTargets);
        }
        Ok(Self {
            connector,
            targets: targets.into(),
        })
    }

    /// Runs every phase in order, writing the progress and result lines for
    /// each to `out`.
    pub async fn run_schedule<W: Write>(
        &self,
        phases: &[Phase],
        out: &mut W,
    ) -> Result<Vec<PhaseStats>> {
        let mut results = Vec::with_capacity(phases.len());
        for (index, phase) in phases.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "{}", phase.announcement())?;
            out.flush()?;

            let stats = self.run_phase(phase).await?;

            writeln!(out, "{stats}")?;
            out.flush()?;
            info!(
                phase = index,
                concurrency = phase.concurrency,
                requests = stats.requests(),
                bytes = stats.bytes(),
                errors = stats.errors(),
                elapsed_ms = stats.elapsed.as_millis() as u64,
                throughput = stats.throughput(),
                "phase complete"
            );
            results.push(stats);
        }
        Ok(results)
    }

    pub async fn run_phase(&self, phase: &Phase) -> Result<PhaseStats> {
        let start = Instant::now();

        if phase.is_pause() {
            debug!(duration_ms = phase.duration.as_millis() as u64, "pausing");
            tokio::time::sleep(phase.duration).await;
            return Ok(PhaseStats {
                totals: WorkerResult::default(),
                elapsed: start.elapsed(),
            });
        }

        let session = self.connector.connect()?;
        let deadline = start + phase.duration;

        let mut workers = JoinSet::new();
        for _ in 0..phase.concurrency {
            workers.spawn(worker(
                Arc::clone(&session),
                Arc::clone(&self.targets),
                deadline,
            ));
        }

        let mut totals = WorkerResult::default();
        while let Some(joined) = workers.join_next().await {
            totals += joined?;
        }
        drop(session);

        Ok(PhaseStats {
            totals,
            elapsed: start.elapsed(),
        })
    }
}

async fn worker(
    session: Arc<dyn Fetcher>,
    targets: Arc<[String]>,
    deadline: Instant,
) -> WorkerResult {
    let mut result = WorkerResult::default();
    while Instant::now() < deadline {
        let path = pick_target(&targets);
        result.record(session.fetch(path).await);
    }
    result
}

/// Uniform choice; `targets` is never empty.
fn pick_target(targets: &[String]) -> &str {
    let index = rand::thread_rng().gen_range(0..targets.len());
    &targets[index]
}
