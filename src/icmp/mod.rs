pub mod checksum;
pub mod errors;
pub mod packet;
pub mod socket;

pub use errors::ErrorTable;
pub use packet::*;
pub use socket::*;

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to open raw ICMP socket: {0}. Elevated privileges (root or CAP_NET_RAW) may be required")]
    SocketUnavailable(#[source] io::Error),
    #[error("ICMP transport error: {0}")]
    Transport(#[from] io::Error),
    #[error("datagram too short: {len} bytes, need {needed}")]
    Truncated { len: usize, needed: usize },
}

impl ProbeError {
    /// Whether the whole run has to stop rather than just this probe.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::SocketUnavailable(_))
    }
}
