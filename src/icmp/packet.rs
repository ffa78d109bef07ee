use byteorder::{BigEndian, ByteOrder};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::icmp::checksum::{checksum, checksum_to_wire};
use crate::icmp::ProbeError;

pub const ICMP_ECHO_REQUEST: u8 = 8;
pub const ICMP_ECHO_REPLY: u8 = 0;
pub const ICMP_DEST_UNREACHABLE: u8 = 3;

pub const ICMP_HEADER_LEN: usize = 8;
pub const TIMESTAMP_LEN: usize = 8;
pub const IPV4_HEADER_LEN: usize = 20;

/// Seconds since the Unix epoch, as carried in the echo payload.
pub fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// An ICMPv4 Echo Request whose payload is the send timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
    pub sent_at: f64,
}

impl EchoRequest {
    pub fn new(identifier: u16, sequence: u16) -> Self {
        Self {
            identifier,
            sequence,
            sent_at: epoch_seconds(),
        }
    }

    /// Header with a zero checksum followed by the timestamp payload, then
    /// the header rewritten with the checksum computed over both.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = [0u8; ICMP_HEADER_LEN + TIMESTAMP_LEN];
        bytes[0] = ICMP_ECHO_REQUEST;
        bytes[1] = 0;
        BigEndian::write_u16(&mut bytes[4..6], self.identifier);
        BigEndian::write_u16(&mut bytes[6..8], self.sequence);
        BigEndian::write_f64(&mut bytes[ICMP_HEADER_LEN..], self.sent_at);

        let wire = checksum_to_wire(checksum(&bytes));
        bytes[2..4].copy_from_slice(&wire);

        bytes.to_vec()
    }
}

pub fn encode_echo_request(identifier: u16, sequence: u16) -> Vec<u8> {
    EchoRequest::new(identifier, sequence).to_bytes()
}

/// ICMP header fields decoded from a received IPv4 datagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: i16,
    /// Send timestamp echoed back in the payload, present on Echo Replies.
    pub sent_at: Option<f64>,
}

impl IcmpHeader {
    /// Stand-in used when a wait expires without any datagram arriving.
    pub fn unreachable() -> Self {
        Self {
            icmp_type: ICMP_DEST_UNREACHABLE,
            code: 0,
            checksum: 0,
            identifier: 0,
            sequence: 0,
            sent_at: None,
        }
    }

    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == ICMP_ECHO_REPLY && self.code == 0
    }

    /// Destination Unreachable, Source Quench, Redirect, Time Exceeded and
    /// Parameter Problem: messages a router sends back about our datagram.
    pub fn is_error_message(&self) -> bool {
        matches!(self.icmp_type, 3 | 4 | 5 | 11 | 12)
    }
}

/// Length of the IPv4 header at the front of a raw-socket datagram.
///
/// Uses the IHL field when the version nibble says IPv4, otherwise assumes
/// a 20-byte header without options.
pub fn ip_header_len(datagram: &[u8]) -> usize {
    match datagram.first() {
        Some(&first) if first >> 4 == 4 => {
            let ihl = ((first & 0x0F) as usize) * 4;
            ihl.max(IPV4_HEADER_LEN)
        }
        _ => IPV4_HEADER_LEN,
    }
}

pub fn decode_icmp_header(datagram: &[u8]) -> Result<IcmpHeader, ProbeError> {
    let offset = ip_header_len(datagram);
    let needed = offset + ICMP_HEADER_LEN;
    if datagram.len() < needed {
        return Err(ProbeError::Truncated {
            len: datagram.len(),
            needed,
        });
    }

    let icmp = &datagram[offset..];
    let mut header = IcmpHeader {
        icmp_type: icmp[0],
        code: icmp[1],
        checksum: BigEndian::read_u16(&icmp[2..4]),
        identifier: BigEndian::read_u16(&icmp[4..6]),
        sequence: BigEndian::read_i16(&icmp[6..8]),
        sent_at: None,
    };

    if header.is_echo_reply() {
        let payload = &icmp[ICMP_HEADER_LEN..];
        if payload.len() < TIMESTAMP_LEN {
            return Err(ProbeError::Truncated {
                len: datagram.len(),
                needed: needed + TIMESTAMP_LEN,
            });
        }
        header.sent_at = Some(BigEndian::read_f64(&payload[..TIMESTAMP_LEN]));
    }

    Ok(header)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Prepend a minimal IPv4 header (version 4, IHL 5, protocol ICMP).
    pub(crate) fn wrap_in_ipv4(icmp: &[u8]) -> Vec<u8> {
        let mut datagram = vec![0u8; IPV4_HEADER_LEN];
        datagram[0] = 0x45;
        datagram[8] = 64;
        datagram[9] = 1;
        BigEndian::write_u16(&mut datagram[2..4], (IPV4_HEADER_LEN + icmp.len()) as u16);
        datagram.extend_from_slice(icmp);
        datagram
    }

    /// Turn an encoded request into the reply a host would send back.
    pub(crate) fn as_echo_reply(request: &[u8]) -> Vec<u8> {
        let mut reply = request.to_vec();
        reply[0] = ICMP_ECHO_REPLY;
        reply[2] = 0;
        reply[3] = 0;
        let wire = checksum_to_wire(checksum(&reply));
        reply[2..4].copy_from_slice(&wire);
        reply
    }

    #[test]
    fn test_echo_request_layout() {
        let request = EchoRequest {
            identifier: 0xBEEF,
            sequence: 1,
            sent_at: 1_700_000_000.25,
        };
        let bytes = request.to_bytes();

        assert_eq!(bytes.len(), ICMP_HEADER_LEN + TIMESTAMP_LEN);
        assert_eq!(bytes[0], ICMP_ECHO_REQUEST);
        assert_eq!(bytes[1], 0);
        assert_eq!(&bytes[4..6], &[0xBE, 0xEF]);
        assert_eq!(&bytes[6..8], &[0x00, 0x01]);
        assert_eq!(BigEndian::read_f64(&bytes[8..]), 1_700_000_000.25);
        assert_eq!(checksum(&bytes), 0);
    }

    #[test]
    fn test_decode_encoded_request() {
        for identifier in [0u16, 1, 0x00FF, 0x1234, 0x8000, 0xFFFF] {
            for sequence in [0u16, 1, 2, 255, 1000] {
                let datagram = wrap_in_ipv4(&encode_echo_request(identifier, sequence));
                let header = decode_icmp_header(&datagram).unwrap();

                assert_eq!(header.icmp_type, ICMP_ECHO_REQUEST);
                assert_eq!(header.code, 0);
                assert_eq!(header.identifier, identifier);
                assert_eq!(header.sequence, sequence as i16);
                assert_eq!(header.sent_at, None);
            }
        }
    }

    #[test]
    fn test_decode_echo_reply_timestamp() {
        let request = EchoRequest {
            identifier: 42,
            sequence: 1,
            sent_at: 12345.5,
        };
        let datagram = wrap_in_ipv4(&as_echo_reply(&request.to_bytes()));
        let header = decode_icmp_header(&datagram).unwrap();

        assert!(header.is_echo_reply());
        assert_eq!(header.identifier, 42);
        assert_eq!(header.sent_at, Some(12345.5));
    }

    #[test]
    fn test_decode_signed_sequence() {
        let request = EchoRequest {
            identifier: 7,
            sequence: 0xFFFF,
            sent_at: 0.0,
        };
        let header = decode_icmp_header(&wrap_in_ipv4(&request.to_bytes())).unwrap();
        assert_eq!(header.sequence, -1);
    }

    #[test]
    fn test_decode_skips_ip_options() {
        let icmp = encode_echo_request(0x0102, 1);
        let mut datagram = vec![0u8; 24];
        datagram[0] = 0x46; // IHL 6 → 24 bytes
        datagram.extend_from_slice(&icmp);

        let header = decode_icmp_header(&datagram).unwrap();
        assert_eq!(header.icmp_type, ICMP_ECHO_REQUEST);
        assert_eq!(header.identifier, 0x0102);
    }

    #[test]
    fn test_decode_error_message() {
        // Destination Host Unreachable quoting the original datagram
        let mut icmp = vec![3, 1, 0, 0, 0, 0, 0, 0];
        icmp.extend_from_slice(&wrap_in_ipv4(&encode_echo_request(9, 1)));
        let header = decode_icmp_header(&wrap_in_ipv4(&icmp)).unwrap();

        assert_eq!((header.icmp_type, header.code), (3, 1));
        assert!(header.is_error_message());
        assert!(!header.is_echo_reply());
        assert_eq!(header.sent_at, None);
    }

    #[test]
    fn test_decode_truncated() {
        let datagram = wrap_in_ipv4(&[0, 0, 0]);
        assert!(matches!(
            decode_icmp_header(&datagram),
            Err(ProbeError::Truncated { len: 23, needed: 28 })
        ));

        // Echo reply without room for the timestamp
        let datagram = wrap_in_ipv4(&[0, 0, 0xFF, 0xFF, 0, 1, 0, 1]);
        assert!(matches!(
            decode_icmp_header(&datagram),
            Err(ProbeError::Truncated { needed: 36, .. })
        ));
    }

    #[test]
    fn test_ip_header_len() {
        assert_eq!(ip_header_len(&[0x45]), 20);
        assert_eq!(ip_header_len(&[0x4F]), 60);
        assert_eq!(ip_header_len(&[0x41]), 20);
        assert_eq!(ip_header_len(&[0x60]), 20);
        assert_eq!(ip_header_len(&[]), 20);
    }
}
