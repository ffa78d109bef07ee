use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::time::sleep;

use crate::icmp::{ErrorTable, ProbeError, Prober, ReplyStatus};
use crate::stats::{summarize, Summary};
use crate::targets::Target;

pub const DEFAULT_PROBE_COUNT: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How the Echo sequence number is chosen for each probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePolicy {
    /// Every probe carries the same sequence number.
    Fixed(u16),
    /// Probe `n` (zero-based) carries `n + 1`.
    Incrementing,
}

impl SequencePolicy {
    pub fn sequence_for(&self, index: u32) -> u16 {
        match self {
            SequencePolicy::Fixed(sequence) => *sequence,
            SequencePolicy::Incrementing => (index as u16).wrapping_add(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub probe_count: u32,
    pub timeout: Duration,
    /// Fixed pause after each probe, independent of how long the probe took.
    pub interval: Duration,
    pub sequence: SequencePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            probe_count: DEFAULT_PROBE_COUNT,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            sequence: SequencePolicy::Fixed(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing usable arrived before the budget ran out.
    Timeout,
    /// An ICMP error message was the last thing we heard.
    Protocol,
    /// Sending or receiving on the socket failed.
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Success {
        latency_ms: f64,
    },
    Failure {
        kind: FailureKind,
        reason: String,
        /// ICMP (type, code) the reason was derived from, if any.
        icmp: Option<(u8, u8)>,
    },
}

impl ProbeOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProbeOutcome::Failure {
                kind: FailureKind::Timeout,
                ..
            }
        )
    }

    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            ProbeOutcome::Success { latency_ms } => Some(*latency_ms),
            ProbeOutcome::Failure { .. } => None,
        }
    }

    /// Turn the result of one reply wait into an outcome.
    ///
    /// Latency is clamped at zero: a loopback reply can come back before the
    /// clock has visibly moved.
    pub fn from_reply(status: &ReplyStatus, errors: &ErrorTable) -> Self {
        match status {
            ReplyStatus::Matched { latency_secs, .. } => ProbeOutcome::Success {
                latency_ms: (latency_secs * 1000.0).max(0.0),
            },
            ReplyStatus::Expired { last_header } => {
                let header = status.header();
                let kind = match last_header {
                    Some(h) if h.is_error_message() => FailureKind::Protocol,
                    _ => FailureKind::Timeout,
                };
                ProbeOutcome::Failure {
                    kind,
                    reason: errors.describe(header.icmp_type, header.code).into_owned(),
                    icmp: Some((header.icmp_type, header.code)),
                }
            }
        }
    }

    pub fn from_error(error: &ProbeError) -> Self {
        ProbeOutcome::Failure {
            kind: FailureKind::Transport,
            reason: error.to_string(),
            icmp: None,
        }
    }
}

/// Everything recorded while pinging one host.
#[derive(Debug, Clone)]
pub struct Session {
    pub target: Target,
    pub address: Ipv4Addr,
    pub probe_count: u32,
    pub timeout: Duration,
    pub outcomes: Vec<ProbeOutcome>,
}

/// Receives session progress; formatting is entirely up to the implementor.
pub trait ProbeReporter {
    fn session_started(&mut self, target: &Target, address: Ipv4Addr);
    /// `index` is one-based.
    fn probe_result(&mut self, index: u32, outcome: &ProbeOutcome);
    fn session_summary(&mut self, summary: &Summary);
}

/// Runs the fixed sequence of probes against one host at a time.
pub struct SessionDriver<'a> {
    config: SessionConfig,
    errors: &'a ErrorTable,
    identifier: u16,
}

impl<'a> SessionDriver<'a> {
    pub fn new(config: SessionConfig, errors: &'a ErrorTable, identifier: u16) -> Self {
        Self {
            config,
            errors,
            identifier,
        }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Probe `address` `probe_count` times, one after the other.
    ///
    /// Per-probe failures are recorded and the session carries on. Only a
    /// socket that cannot be opened at all ends it early with an error.
    pub async fn run<P: Prober, R: ProbeReporter>(
        &self,
        target: &Target,
        address: Ipv4Addr,
        prober: &mut P,
        reporter: &mut R,
    ) -> Result<Session, ProbeError> {
        log::info!(
            "Probing {} ({}) with identifier {}",
            target.label,
            address,
            self.identifier
        );
        reporter.session_started(target, address);

        let mut session = Session {
            target: target.clone(),
            address,
            probe_count: self.config.probe_count,
            timeout: self.config.timeout,
            outcomes: Vec::with_capacity(self.config.probe_count as usize),
        };

        for index in 0..self.config.probe_count {
            let sequence = self.config.sequence.sequence_for(index);
            let outcome = match prober
                .probe(address, self.identifier, sequence, self.config.timeout)
                .await
            {
                Ok(status) => ProbeOutcome::from_reply(&status, self.errors),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Probe {} to {} failed: {}", index + 1, address, e);
                    ProbeOutcome::from_error(&e)
                }
            };

            reporter.probe_result(index + 1, &outcome);
            session.outcomes.push(outcome);

            if index + 1 < self.config.probe_count {
                sleep(self.config.interval).await;
            }
        }

        let summary = summarize(&session.outcomes);
        log::info!(
            "Finished {}: {}/{} replies",
            target.label,
            summary.received,
            summary.sent
        );
        reporter.session_summary(&summary);

        Ok(session)
    }
}
