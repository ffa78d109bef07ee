use std::fmt;
use std::str::FromStr;

/// A host to probe and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub label: String,
    pub host: String,
}

impl Target {
    pub fn new(label: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            host: host.into(),
        }
    }

    pub fn localhost() -> Self {
        Self::new("self", "127.0.0.1")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label == self.host {
            write!(f, "{}", self.host)
        } else {
            write!(f, "{} ({})", self.label, self.host)
        }
    }
}

/// Accepts `LABEL=HOST` or a bare `HOST`, which is then its own label.
impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, host) = match s.split_once('=') {
            Some((label, host)) => (label.trim(), host.trim()),
            None => (s.trim(), s.trim()),
        };

        if label.is_empty() {
            return Err(format!("missing label in target '{}'", s));
        }
        if host.is_empty() {
            return Err(format!("missing host in target '{}'", s));
        }
        Ok(Self::new(label, host))
    }
}

/// One server per continent, probed when no targets are given.
pub fn default_targets() -> Vec<Target> {
    [
        ("North America", "207.228.238.7"),
        ("South America", "131.255.7.26"),
        ("Europe", "51.158.22.211"),
        ("Australia", "101.0.86.43"),
        ("Asia", "47.94.129.116"),
        ("Africa", "197.221.23.194"),
    ]
    .into_iter()
    .map(|(label, host)| Target::new(label, host))
    .collect()
}
