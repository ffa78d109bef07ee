use colored::Colorize;

use crate::session::ProbeOutcome;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Aggregate view of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sent: u32,
    pub received: u32,
    pub loss_percent: f64,
    /// Absent when no probe succeeded.
    pub latency: Option<LatencyStats>,
}

#[derive(Debug, Clone)]
pub struct PingStatistics {
    pub packets_sent: u32,
    pub packets_received: u32,
    pub packets_lost: u32,
    pub min_time: f64,
    pub max_time: f64,
    pub total_time: f64,
}

impl PingStatistics {
    pub fn new() -> Self {
        Self {
            packets_sent: 0,
            packets_received: 0,
            packets_lost: 0,
            min_time: f64::INFINITY,
            max_time: f64::NEG_INFINITY,
            total_time: 0.0,
        }
    }

    pub fn record(&mut self, outcome: &ProbeOutcome) {
        self.packets_sent += 1;
        match outcome.latency_ms() {
            Some(time_ms) => self.record_received(time_ms),
            None => self.packets_lost += 1,
        }
    }

    fn record_received(&mut self, time_ms: f64) {
        self.packets_received += 1;
        self.total_time += time_ms;
        self.min_time = self.min_time.min(time_ms);
        self.max_time = self.max_time.max(time_ms);
    }

    pub fn loss_percentage(&self) -> f64 {
        if self.packets_sent == 0 {
            return 0.0;
        }
        (self.packets_lost as f64 * 100.0) / self.packets_sent as f64
    }

    pub fn latency(&self) -> Option<LatencyStats> {
        if self.packets_received == 0 {
            return None;
        }
        Some(LatencyStats {
            min: self.min_time,
            max: self.max_time,
            avg: self.total_time / self.packets_received as f64,
        })
    }

    pub fn summary(&self) -> Summary {
        Summary {
            sent: self.packets_sent,
            received: self.packets_received,
            loss_percent: self.loss_percentage(),
            latency: self.latency(),
        }
    }
}

impl Default for PingStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Min/avg/max over successful probes and loss over all of them.
pub fn summarize(outcomes: &[ProbeOutcome]) -> Summary {
    let mut stats = PingStatistics::new();
    for outcome in outcomes {
        stats.record(outcome);
    }
    stats.summary()
}

pub fn format_latency(ms: f64) -> String {
    format!("{:.3} ms", ms)
}

pub fn format_summary(summary: &Summary) -> String {
    let mut text = String::new();

    if let Some(latency) = summary.latency {
        text.push_str(&format!(
            "\n{} {}\n{} {}\n{} {}\n",
            "Maximum Ping Time:".cyan(),
            format_latency(latency.max),
            "Minimum Ping Time:".cyan(),
            format_latency(latency.min),
            "Average Ping Time:".cyan(),
            format_latency(latency.avg),
        ));
    }

    text.push_str(&format!(
        "{} {:.1}%",
        "Packet Loss:".cyan(),
        summary.loss_percent
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FailureKind;

    fn success(latency_ms: f64) -> ProbeOutcome {
        ProbeOutcome::Success { latency_ms }
    }

    fn timeout() -> ProbeOutcome {
        ProbeOutcome::Failure {
            kind: FailureKind::Timeout,
            reason: "Destination Network Unreachable".to_string(),
            icmp: Some((3, 0)),
        }
    }

    #[test]
    fn test_statistics_calculation() {
        let outcomes = vec![success(10.5), success(20.3), timeout()];
        let summary = summarize(&outcomes);

        assert_eq!(summary.sent, 3);
        assert_eq!(summary.received, 2);
        assert!((summary.loss_percent - 33.333333333333336).abs() < 0.0001);

        let latency = summary.latency.unwrap();
        assert_eq!(latency.min, 10.5);
        assert_eq!(latency.max, 20.3);
        assert!((latency.avg - 15.4).abs() < 1e-9);
    }

    #[test]
    fn test_loss_accounting() {
        for k in 0..=10usize {
            let mut outcomes: Vec<ProbeOutcome> = (0..k).map(|i| success(i as f64)).collect();
            outcomes.extend((k..10).map(|_| timeout()));

            let summary = summarize(&outcomes);
            assert_eq!(summary.received as usize, k);
            assert_eq!(summary.loss_percent, (10 - k) as f64 * 10.0);
            assert_eq!(summary.latency.is_some(), k > 0);
        }
    }

    #[test]
    fn test_all_lost() {
        let outcomes = vec![timeout(); 10];
        let summary = summarize(&outcomes);

        assert_eq!(summary.loss_percent, 100.0);
        assert_eq!(summary.latency, None);
    }

    #[test]
    fn test_zero_latency_replies() {
        let outcomes = vec![success(0.0); 10];
        let summary = summarize(&outcomes);

        assert_eq!(summary.loss_percent, 0.0);
        assert_eq!(
            summary.latency,
            Some(LatencyStats {
                min: 0.0,
                max: 0.0,
                avg: 0.0
            })
        );
    }

    #[test]
    fn test_empty_session() {
        let summary = summarize(&[]);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.loss_percent, 0.0);
        assert_eq!(summary.latency, None);
    }

    #[test]
    fn test_summary_formatting() {
        colored::control::set_override(false);

        let summary = summarize(&[success(10.0), timeout()]);
        let text = format_summary(&summary);
        assert!(text.contains("Maximum Ping Time: 10.000 ms"));
        assert!(text.contains("Minimum Ping Time: 10.000 ms"));
        assert!(text.contains("Average Ping Time: 10.000 ms"));
        assert!(text.ends_with("Packet Loss: 50.0%"));

        let text = format_summary(&summarize(&[timeout(), timeout()]));
        assert_eq!(text, "Packet Loss: 100.0%");
    }
}
