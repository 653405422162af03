//! Execution scheduler: drive a compiled timeline through a [`Transport`].
//!
//! ## Run loop
//!
//! Commands are stable-sorted by tick and walked once.  A `last_tick` cursor
//! starts at 0.  For each command:
//!
//! 1. cancelled?  → stop
//! 2. placeholder → recorded as skipped; no wait, no submission, cursor kept
//! 3. `realtime` and `tick > last_tick` → sleep `(tick - last_tick) × tick_delay_ms`
//! 4. cancelled?  → stop
//! 5. submit exactly once; success or failure is recorded, the run goes on
//! 6. `last_tick = tick`
//!
//! Timeouts belong to the transport.  A transport error is an ordinary failed
//! [`CommandResult`].  Nothing already submitted is retracted on cancel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::error::TransportError;
use crate::types::{CompilerSettings, Tick};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Submission boundary to a live world.
///
/// Implementations must be safe to share between concurrently running
/// schedulers; each scheduler keeps its own stream sequential.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one command and return the world's response text.
    async fn submit(&self, command: &str) -> Result<String, TransportError>;
}

/// Records submissions and acknowledges them without touching a world.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    transcript: Mutex<Vec<String>>,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submitted command, in submission order.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().clone()
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    async fn submit(&self, command: &str) -> Result<String, TransportError> {
        info!("[dry-run] {}", command);
        self.transcript.lock().push(command.to_string());
        Ok("ok (dry run)".to_string())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandResult {
    pub tick: Tick,
    pub command: String,
    pub success: bool,
    /// Transport response on success, error text on failure, a fixed note
    /// for skipped placeholders.
    pub response: String,
    pub skipped: bool,
}

impl CommandResult {
    fn skipped(command: &Command) -> Self {
        Self {
            tick: command.tick,
            command: command.command.clone(),
            success: true,
            response: "skipped (placeholder)".to_string(),
            skipped: true,
        }
    }

    fn submitted(command: &Command, outcome: Result<String, TransportError>) -> Self {
        let (success, response) = match outcome {
            Ok(response) => (true, response),
            Err(e) => (false, e.to_string()),
        };
        Self {
            tick: command.tick,
            command: command.command.clone(),
            success,
            response,
            skipped: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunReport {
    /// One entry per command reached, in execution order.
    pub results: Vec<CommandResult>,
    /// The run stopped early on cancellation.
    pub cancelled: bool,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.results.len(),
            ..Default::default()
        };
        for result in &self.results {
            if result.skipped {
                summary.skipped += 1;
            } else if result.success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}

/// Aggregate counts.  Callers judge a run by its success ratio.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Commands that were actually submitted.
    pub fn submitted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} commands succeeded", self.succeeded, self.submitted())?;
        if self.skipped > 0 {
            write!(f, " ({} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub tick_delay_ms: u64,
    pub realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick_delay_ms: 50,
            realtime: false,
        }
    }
}

impl From<&CompilerSettings> for RunOptions {
    fn from(settings: &CompilerSettings) -> Self {
        Self {
            tick_delay_ms: settings.tick_delay_ms,
            realtime: settings.realtime,
        }
    }
}

pub struct Scheduler {
    transport: Arc<dyn Transport>,
    options: RunOptions,
}

impl Scheduler {
    pub fn new(transport: Arc<dyn Transport>, options: RunOptions) -> Self {
        Self { transport, options }
    }

    /// Run `commands` to completion or until `cancel` fires.
    pub async fn run(&self, commands: &[Command], cancel: &CancellationToken) -> RunReport {
        let mut ordered: Vec<&Command> = commands.iter().collect();
        ordered.sort_by_key(|c| c.tick);

        let mut report = RunReport::default();
        let mut last_tick: Tick = 0;

        for command in ordered {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            if !command.is_executable() {
                report.results.push(CommandResult::skipped(command));
                continue;
            }

            if self.options.realtime && command.tick > last_tick {
                let delay = self.pacing_delay(command.tick - last_tick);
                debug!("Waiting {:?} before tick {}", delay, command.tick);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                }
            }

            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let outcome = self.transport.submit(&command.command).await;
            if let Err(e) = &outcome {
                warn!("Command at tick {} failed: {}", command.tick, e);
            }
            report.results.push(CommandResult::submitted(command, outcome));
            last_tick = command.tick;
        }

        if report.cancelled {
            info!("Run cancelled after {} results", report.results.len());
        } else {
            info!("Run finished: {}", report.summary());
        }
        report
    }

    fn pacing_delay(&self, ticks: Tick) -> Duration {
        Duration::from_millis(ticks.saturating_mul(self.options.tick_delay_ms))
    }
}
