/// Compute the ICMP one's-complement checksum of `data`.
///
/// Words are summed little-endian and the folded, complemented result is
/// byte-swapped, so the returned value is the checksum in network order
/// semantics: write it with [`checksum_to_wire`] and the field is correct on
/// the wire. A trailing odd byte is added as a standalone low-order byte.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = data
        .chunks(2)
        .map(|word| match *word {
            [lo, hi] => u16::from_le_bytes([lo, hi]) as u32,
            [lo] => lo as u32,
            _ => unreachable!(),
        })
        .fold(0u32, u32::wrapping_add);

    // End-around carry
    while (sum >> 16) != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }

    let answer = !sum & 0xFFFF;
    (answer as u16).swap_bytes()
}

/// Convert a checksum from [`checksum`] into the two bytes placed in the
/// ICMP header.
///
/// Every raw-socket quirk around the checksum field belongs here. Linux,
/// macOS and Windows all transmit the field exactly as written; the 16-bit
/// mask macOS needs is implied by `u16`.
pub fn checksum_to_wire(checksum: u16) -> [u8; 2] {
    checksum.to_be_bytes()
}
