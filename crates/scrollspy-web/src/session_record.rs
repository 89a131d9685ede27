#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`StepSession`] and logs every host event and
//! every step checkpoint. [`replay`] feeds the recorded events through a
//! fresh session built from the recorded configuration and checks that each
//! step produces byte-identical outputs.
//!
//! # Format
//!
//! A trace is JSON Lines, one [`TraceRecord`] per line, tagged by `"record"`:
//!
//! - **header**: schema version and the page configuration (must be first).
//! - **input**: one host event, tagged with the step it belongs to.
//! - **step**: checkpoint with the output checksum and the chained checksum.
//! - **summary**: step count and final chain (must be last).
//!
//! # Example
//!
//! ```ignore
//! let mut recorder = SessionRecorder::new(SpyConfig::default())?;
//! recorder.push_event(HostEvent::Enter { color: "red".into(), handle: ElementHandle(1), bounds: None });
//! recorder.step()?;
//!
//! let jsonl = recorder.finish().to_jsonl()?;
//! let trace = SessionTrace::from_jsonl(&jsonl)?;
//! assert!(replay(&trace)?.ok());
//! ```

use std::fmt;

use scrollspy_core::config::{ConfigError, SpyConfig};
use scrollspy_core::item::Color;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::step_session::{StepResult, StepSession};
use crate::{HostError, HostEvent, WebOutputs};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "scrollspy-trace-v1";

fn chain(prev: u64, next: u64) -> u64 {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&prev.to_le_bytes());
    bytes[8..].copy_from_slice(&next.to_le_bytes());
    crate::fnv1a64(&bytes)
}

/// A single line of a session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header.
    Header {
        /// Always [`SCHEMA_VERSION`] when written by this crate.
        schema: String,
        /// Page configuration the session was built from.
        config: SpyConfig,
    },
    /// A host event pushed before `step` ran.
    Input {
        /// Step the event was consumed by.
        step: u64,
        /// The event as the host sent it.
        event: HostEvent,
    },
    /// Step checkpoint.
    Step {
        /// Step index, contiguous from zero.
        step: u64,
        /// Host events consumed by the step.
        events_processed: u32,
        /// `fnv1a64` of the outputs drained after the step.
        checksum: u64,
        /// Checksum folded with every earlier step's.
        checksum_chain: u64,
        /// Active item after the step, for human readers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<Color>,
    },
    /// Trace summary.
    Summary {
        /// Number of step records.
        total_steps: u64,
        /// Chain value of the last step.
        final_checksum_chain: u64,
    },
}

impl TraceRecord {
    fn kind(&self) -> &'static str {
        match self {
            Self::Header { .. } => "header",
            Self::Input { .. } => "input",
            Self::Step { .. } => "step",
            Self::Summary { .. } => "summary",
        }
    }
}

/// A complete recorded session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrace {
    /// Records in file order.
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of step checkpoints.
    pub fn step_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Step { .. }))
            .count() as u64
    }

    /// Final chain from the summary record.
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Configuration from the header record.
    pub fn config(&self) -> Option<&SpyConfig> {
        match self.records.first() {
            Some(TraceRecord::Header { config, .. }) => Some(config),
            _ => None,
        }
    }

    /// Check structural invariants.
    ///
    /// Header first, summary last, nothing else in between of either kind,
    /// step indices contiguous from zero, and inputs tagged with the step
    /// that follows them.
    pub fn validate(&self) -> Result<(), TraceError> {
        match self.records.first() {
            Some(TraceRecord::Header { schema, .. }) if schema == SCHEMA_VERSION => {}
            Some(TraceRecord::Header { schema, .. }) => {
                return Err(TraceError::UnsupportedSchema(schema.clone()));
            }
            _ => return Err(TraceError::MissingHeader),
        }

        let last = self.records.len() - 1;
        let mut next_step = 0u64;
        for (idx, record) in self.records.iter().enumerate().skip(1) {
            match record {
                TraceRecord::Header { .. } => {
                    return Err(TraceError::Misplaced { index: idx, kind: "header" });
                }
                TraceRecord::Summary { total_steps, .. } => {
                    if idx != last {
                        return Err(TraceError::Misplaced { index: idx, kind: "summary" });
                    }
                    if *total_steps != next_step {
                        return Err(TraceError::StepCount {
                            declared: *total_steps,
                            actual: next_step,
                        });
                    }
                }
                TraceRecord::Input { step, .. } => {
                    if *step != next_step {
                        return Err(TraceError::StepOrder {
                            index: idx,
                            expected: next_step,
                            found: *step,
                        });
                    }
                }
                TraceRecord::Step { step, .. } => {
                    if *step != next_step {
                        return Err(TraceError::StepOrder {
                            index: idx,
                            expected: next_step,
                            found: *step,
                        });
                    }
                    next_step += 1;
                }
            }
        }

        match self.records.last() {
            Some(TraceRecord::Summary { .. }) => Ok(()),
            _ => Err(TraceError::MissingSummary),
        }
    }

    /// Encode as JSON Lines.
    pub fn to_jsonl(&self) -> Result<String, TraceError> {
        let mut out = String::new();
        for (idx, record) in self.records.iter().enumerate() {
            let line = serde_json::to_string(record)
                .map_err(|source| TraceError::Json { line: idx + 1, source })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Decode JSON Lines. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, TraceError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(line)
                .map_err(|source| TraceError::Json { line: idx + 1, source })?;
            records.push(record);
        }
        Ok(Self { records })
    }
}

/// Trace loading and replay errors.
#[derive(Debug)]
pub enum TraceError {
    /// A line was not a valid record.
    Json {
        /// 1-based line number.
        line: usize,
        /// Decoder error.
        source: serde_json::Error,
    },
    /// The first record is not a header.
    MissingHeader,
    /// The last record is not a summary.
    MissingSummary,
    /// The header names a schema this crate does not read.
    UnsupportedSchema(String),
    /// A header or summary record appears out of place.
    Misplaced {
        /// Record position.
        index: usize,
        /// Record kind found there.
        kind: &'static str,
    },
    /// A record carries the wrong step index.
    StepOrder {
        /// Record position.
        index: usize,
        /// Step index the record should carry.
        expected: u64,
        /// Step index it carries.
        found: u64,
    },
    /// The summary disagrees with the number of step records.
    StepCount {
        /// Count in the summary.
        declared: u64,
        /// Step records present.
        actual: u64,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { line, source } => write!(f, "line {line}: {source}"),
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::MissingSummary => write!(f, "trace missing summary record"),
            Self::UnsupportedSchema(schema) => write!(f, "unsupported trace schema {schema:?}"),
            Self::Misplaced { index, kind } => write!(f, "record {index}: unexpected {kind}"),
            Self::StepOrder {
                index,
                expected,
                found,
            } => write!(f, "record {index}: expected step {expected}, found {found}"),
            Self::StepCount { declared, actual } => {
                write!(f, "summary declares {declared} steps but trace has {actual}")
            }
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// Records a session as it runs.
pub struct SessionRecorder {
    session: StepSession,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    step_idx: u64,
}

impl SessionRecorder {
    /// Build and initialize a session from `config`.
    ///
    /// The initial outputs are discarded; they depend only on the config.
    pub fn new(config: SpyConfig) -> Result<Self, ConfigError> {
        let mut session = StepSession::from_config(&config)?;
        session.init();
        session.take_outputs();
        Ok(Self {
            session,
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_string(),
                config,
            }],
            checksum_chain: 0,
            step_idx: 0,
        })
    }

    /// Record and queue a host event.
    pub fn push_event(&mut self, event: HostEvent) {
        self.records.push(TraceRecord::Input {
            step: self.step_idx,
            event: event.clone(),
        });
        self.session.push_event(event);
    }

    /// Step the session, record a checkpoint, and hand back the outputs.
    pub fn step(&mut self) -> Result<(StepResult, WebOutputs), HostError> {
        let result = self.session.step();
        let outputs = self.session.take_outputs();
        let checksum = outputs.checksum()?;
        self.checksum_chain = chain(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Step {
            step: self.step_idx,
            events_processed: result.events_processed,
            checksum,
            checksum_chain: self.checksum_chain,
            active: self.session.view().active,
        });
        self.step_idx += 1;
        Ok((result, outputs))
    }

    /// Close the trace.
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_steps: self.step_idx,
            final_checksum_chain: self.checksum_chain,
        });
        debug!(steps = self.step_idx, "session recording finished");
        SessionTrace {
            records: self.records,
        }
    }

    /// Underlying session.
    pub fn session(&self) -> &StepSession {
        &self.session
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// First step whose outputs differed from the recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Step index.
    pub step: u64,
    /// Checksum from the trace.
    pub expected: u64,
    /// Checksum from the replay.
    pub actual: u64,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Steps replayed.
    pub total_steps: u64,
    /// Chain value after the last replayed step.
    pub final_checksum_chain: u64,
    /// First divergent step, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether every step matched.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Errors that stop a replay before it finishes.
#[derive(Debug)]
pub enum ReplayError {
    /// The trace is malformed.
    InvalidTrace(TraceError),
    /// The recorded configuration no longer validates.
    Config(ConfigError),
    /// Outputs could not be encoded.
    Host(HostError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTrace(e) => write!(f, "invalid trace: {e}"),
            Self::Config(e) => write!(f, "invalid recorded config: {e}"),
            Self::Host(e) => write!(f, "host error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTrace(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Host(e) => Some(e),
        }
    }
}

impl From<TraceError> for ReplayError {
    fn from(e: TraceError) -> Self {
        Self::InvalidTrace(e)
    }
}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HostError> for ReplayError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

/// Replay `trace` through a fresh session and compare step checksums.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    trace.validate()?;
    let config = trace.config().ok_or(TraceError::MissingHeader)?;

    let mut session = StepSession::from_config(config)?;
    session.init();
    session.take_outputs();

    let mut total_steps = 0u64;
    let mut checksum_chain = 0u64;
    let mut first_mismatch = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { event, .. } => session.push_event(event.clone()),
            TraceRecord::Step {
                step,
                checksum: expected,
                ..
            } => {
                session.step();
                let actual = session.take_outputs().checksum()?;
                checksum_chain = chain(checksum_chain, actual);
                total_steps += 1;
                if actual != *expected && first_mismatch.is_none() {
                    warn!(step, expected, actual, "replay diverged");
                    first_mismatch = Some(ReplayMismatch {
                        step: *step,
                        expected: *expected,
                        actual,
                    });
                }
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {
                debug!(kind = record.kind(), "skipping framing record");
            }
        }
    }

    Ok(ReplayResult {
        total_steps,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
