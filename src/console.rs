use colored::Colorize;
use std::net::Ipv4Addr;

use crate::session::{ProbeOutcome, ProbeReporter};
use crate::stats::{format_latency, format_summary, Summary};
use crate::targets::Target;

pub const SEPARATOR: &str = "-------------------------------------------------";

pub fn format_header(target: &Target, address: Ipv4Addr) -> String {
    format!(
        "{} {} {}",
        "Pinging".yellow(),
        target.label.green(),
        format!("({}):", address).yellow()
    )
}

pub fn format_probe_result(index: u32, outcome: &ProbeOutcome) -> String {
    let label = format!("Ping {}:", index).cyan();
    match outcome {
        ProbeOutcome::Success { latency_ms } => {
            format!("{}\n{}", label, format_latency(*latency_ms))
        }
        ProbeOutcome::Failure { reason, icmp, .. } => {
            let detail = match icmp {
                Some((_, code)) => format!("{}: {}", code, reason),
                None => reason.clone(),
            };
            let suffix = if outcome.is_timeout() { " (timed out)" } else { "" };
            format!("{}\n{} {}{}", label, "Error".red(), detail, suffix)
        }
    }
}

/// Writes session progress to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProbeReporter for ConsoleReporter {
    fn session_started(&mut self, target: &Target, address: Ipv4Addr) {
        println!("{}\n", format_header(target, address));
    }

    fn probe_result(&mut self, index: u32, outcome: &ProbeOutcome) {
        println!("{}", format_probe_result(index, outcome));
    }

    fn session_summary(&mut self, summary: &Summary) {
        println!("{}", format_summary(summary));
        println!("\n{}\n", SEPARATOR);
    }
}
