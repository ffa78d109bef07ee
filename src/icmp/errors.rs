use std::borrow::Cow;
use std::collections::HashMap;

/// ICMPv4 (type, code) descriptions.
const ICMPV4_MESSAGES: &[(u8, u8, &str)] = &[
    (0, 0, "Echo Reply"),
    (3, 0, "Destination Network Unreachable"),
    (3, 1, "Destination Host Unreachable"),
    (3, 2, "Destination protocol unreachable"),
    (3, 3, "Destination port unreachable"),
    (3, 4, "Fragmentation required, and DF flag set"),
    (3, 5, "Source route failed"),
    (3, 6, "Destination network unknown"),
    (3, 7, "Destination host unknown"),
    (3, 8, "Source host isolated"),
    (3, 9, "Network administratively prohibited"),
    (3, 10, "Host administratively prohibited"),
    (3, 11, "Network unreachable for TOS"),
    (3, 12, "Host unreachable for TOS"),
    (3, 13, "Communication administratively prohibited"),
    (3, 14, "Host Precedence Violation"),
    (3, 15, "Precedence cutoff in effect"),
    (4, 0, "Source quench"),
    (5, 0, "Redirect Datagram for the Network"),
    (5, 1, "Redirect Datagram for the Host"),
    (5, 2, "Redirect Datagram for the TOS & network"),
    (5, 3, "Redirect Datagram for the TOS & host"),
    (8, 0, "Echo request"),
    (9, 0, "Router Advertisement"),
    (10, 0, "Router discovery/selection/solicitation"),
    (11, 0, "TTL expired in transit"),
    (11, 1, "Fragment reassembly time exceeded"),
    (12, 0, "Pointer indicates the error"),
    (12, 1, "Missing a required option"),
    (12, 2, "Bad length"),
    (13, 0, "Timestamp"),
    (14, 0, "Timestamp reply"),
];

/// Immutable lookup from ICMP (type, code) to a readable description.
///
/// Built once and handed to whoever classifies replies, so a different
/// table can be swapped in without touching the probe logic.
#[derive(Debug, Clone)]
pub struct ErrorTable {
    messages: HashMap<(u8, u8), &'static str>,
}

impl ErrorTable {
    pub fn icmpv4() -> Self {
        Self::from_entries(ICMPV4_MESSAGES)
    }

    pub fn from_entries(entries: &[(u8, u8, &'static str)]) -> Self {
        let messages = entries
            .iter()
            .map(|&(icmp_type, code, message)| ((icmp_type, code), message))
            .collect();
        Self { messages }
    }

    pub fn lookup(&self, icmp_type: u8, code: u8) -> Option<&'static str> {
        self.messages.get(&(icmp_type, code)).copied()
    }

    /// Description for `(icmp_type, code)`, degrading to a generic message
    /// for pairs the table does not know.
    pub fn describe(&self, icmp_type: u8, code: u8) -> Cow<'static, str> {
        match self.lookup(icmp_type, code) {
            Some(message) => Cow::Borrowed(message),
            None => {
                log::debug!("No description for ICMP type {} code {}", icmp_type, code);
                Cow::Owned(format!(
                    "Unknown ICMP condition (type {}, code {})",
                    icmp_type, code
                ))
            }
        }
    }
}

impl Default for ErrorTable {
    fn default() -> Self {
        Self::icmpv4()
    }
}
