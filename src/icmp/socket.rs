use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};

use crate::icmp::{decode_icmp_header, encode_echo_request, epoch_seconds, IcmpHeader, ProbeError};

/// Raw sockets ignore the port, any value will do.
const PROBE_PORT: u16 = 1;
const RECV_BUFFER_LEN: usize = 1024;
/// Smallest read timeout handed to the kernel; a zero timeval means "block forever".
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// One wake-up of a blocking wait.
#[derive(Debug)]
pub enum Wake {
    Datagram {
        bytes: Vec<u8>,
        /// Epoch seconds at which the datagram was read.
        received_at: f64,
        /// Time spent blocked before it arrived.
        waited: Duration,
    },
    /// The wait was cut short by a signal before anything arrived.
    Interrupted { waited: Duration },
    Expired,
}

/// Something that can block for up to a budget waiting for the next datagram.
pub trait ReplySource {
    fn wait_for_datagram(&mut self, budget: Duration) -> Result<Wake, ProbeError>;
}

/// Result of waiting for the Echo Reply that matches our identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyStatus {
    Matched { latency_secs: f64, header: IcmpHeader },
    Expired { last_header: Option<IcmpHeader> },
}

impl ReplyStatus {
    /// Header the outcome is classified from. An expiry with nothing observed
    /// reports a synthetic Destination Unreachable.
    pub fn header(&self) -> IcmpHeader {
        match self {
            ReplyStatus::Matched { header, .. } => *header,
            ReplyStatus::Expired { last_header } => {
                last_header.unwrap_or_else(IcmpHeader::unreachable)
            }
        }
    }
}

/// Wait until an Echo Reply carrying `identifier` arrives or `timeout` is used up.
///
/// Every datagram that is not the matching reply, including stray ICMP
/// traffic for other processes, is charged against the remaining budget.
pub fn await_reply<S: ReplySource>(
    source: &mut S,
    identifier: u16,
    timeout: Duration,
) -> Result<ReplyStatus, ProbeError> {
    let mut remaining = timeout;
    let mut last_header = None;

    while !remaining.is_zero() {
        let (bytes, received_at, waited) = match source.wait_for_datagram(remaining)? {
            Wake::Datagram {
                bytes,
                received_at,
                waited,
            } => (bytes, received_at, waited),
            Wake::Interrupted { waited } => {
                remaining = remaining.saturating_sub(waited);
                continue;
            }
            Wake::Expired => {
                log::debug!("No datagram within {:?}", remaining);
                break;
            }
        };

        match decode_icmp_header(&bytes) {
            Ok(header) => {
                log::debug!(
                    "Received ICMP type {} code {} checksum {:#06x} id {} seq {} ({} bytes)",
                    header.icmp_type,
                    header.code,
                    header.checksum,
                    header.identifier,
                    header.sequence,
                    bytes.len()
                );

                if header.is_echo_reply() && header.identifier == identifier {
                    if let Some(sent_at) = header.sent_at {
                        return Ok(ReplyStatus::Matched {
                            latency_secs: received_at - sent_at,
                            header,
                        });
                    }
                }
                last_header = Some(header);
            }
            Err(e) => log::debug!("Ignoring datagram: {}", e),
        }

        remaining = remaining.saturating_sub(waited);
    }

    log::debug!("Reply budget of {:?} exhausted", timeout);
    Ok(ReplyStatus::Expired { last_header })
}

/// A raw ICMPv4 socket used for a single request/reply round trip.
pub struct IcmpSocket {
    socket: Socket,
}

impl IcmpSocket {
    pub fn open() -> Result<Self, ProbeError> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(ProbeError::SocketUnavailable)?;
        socket.set_nonblocking(false)?;

        log::debug!("Opened raw ICMP socket");
        Ok(Self { socket })
    }

    pub fn send_probe(
        &self,
        destination: Ipv4Addr,
        identifier: u16,
        sequence: u16,
    ) -> Result<(), ProbeError> {
        let bytes = encode_echo_request(identifier, sequence);
        let address = SockAddr::from(SocketAddrV4::new(destination, PROBE_PORT));

        self.socket.send_to(&bytes, &address)?;
        log::debug!(
            "Sent echo request to {}: id {} seq {} ({} bytes)",
            destination,
            identifier,
            sequence,
            bytes.len()
        );
        Ok(())
    }
}

impl ReplySource for IcmpSocket {
    fn wait_for_datagram(&mut self, budget: Duration) -> Result<Wake, ProbeError> {
        let started = Instant::now();
        self.socket
            .set_read_timeout(Some(budget.max(MIN_READ_TIMEOUT)))?;

        let mut buffer = [0u8; RECV_BUFFER_LEN];
        match self.socket.read(&mut buffer) {
            Ok(len) => Ok(Wake::Datagram {
                bytes: buffer[..len].to_vec(),
                received_at: epoch_seconds(),
                waited: started.elapsed(),
            }),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(Wake::Expired)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Wake::Interrupted {
                waited: started.elapsed(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for IcmpSocket {
    fn drop(&mut self) {
        log::debug!("Closed raw ICMP socket");
    }
}

/// Open a socket, send one request, wait for its reply and close the socket.
pub fn round_trip(
    destination: Ipv4Addr,
    identifier: u16,
    sequence: u16,
    timeout: Duration,
) -> Result<ReplyStatus, ProbeError> {
    let mut socket = IcmpSocket::open()?;
    socket.send_probe(destination, identifier, sequence)?;
    await_reply(&mut socket, identifier, timeout)
}

/// Performs one probe against a destination.
#[allow(async_fn_in_trait)]
pub trait Prober {
    async fn probe(
        &mut self,
        destination: Ipv4Addr,
        identifier: u16,
        sequence: u16,
        timeout: Duration,
    ) -> Result<ReplyStatus, ProbeError>;
}

/// Prober backed by a fresh raw socket per probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawSocketProber;

impl Prober for RawSocketProber {
    async fn probe(
        &mut self,
        destination: Ipv4Addr,
        identifier: u16,
        sequence: u16,
        timeout: Duration,
    ) -> Result<ReplyStatus, ProbeError> {
        tokio::task::spawn_blocking(move || round_trip(destination, identifier, sequence, timeout))
            .await
            .map_err(|e| ProbeError::Transport(io::Error::other(e)))?
    }
}

/// Open and immediately close a raw socket to find out whether we may.
pub fn check_raw_socket_privileges() -> Result<(), ProbeError> {
    IcmpSocket::open().map(drop)
}
