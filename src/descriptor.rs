//! Parsing for the descriptor payloads backends hand back.
//! Pure functions; no device I/O happens here.

use crate::error::{Error, UsbResult};
use crate::request::DescriptorType;

/// Length of the fixed Binary Object Store header: bLength, bDescriptorType,
/// wTotalLength, bNumDeviceCaps.
pub const BOS_HEADER_LENGTH: usize = 5;

/// Largest possible string descriptor; bLength is a single byte.
pub const STRING_BUFFER_LENGTH: usize = 255;

/// The parsed header of a Binary Object Store descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BosInfo {
    /// Total length of the BOS block, header included.
    pub total_length: usize,

    /// Number of device capability blocks the BOS block carries.
    pub capability_count: u8,
}

/// A single device capability block, cut out of a BOS descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// The bDevCapabilityType field identifying what this block describes.
    pub capability_type: u8,

    /// The capability-specific payload that follows the block header.
    pub data: Vec<u8>,
}

/// Parses the fixed header of a BOS descriptor.
pub fn parse_bos_header(raw: &[u8]) -> UsbResult<BosInfo> {
    if raw.len() < BOS_HEADER_LENGTH
        || raw[0] as usize != BOS_HEADER_LENGTH
        || raw[1] != DescriptorType::Bos as u8
    {
        return Err(Error::MalformedDescriptor);
    }

    let total_length = u16::from_le_bytes([raw[2], raw[3]]) as usize;
    if total_length < BOS_HEADER_LENGTH {
        return Err(Error::MalformedDescriptor);
    }

    Ok(BosInfo {
        total_length,
        capability_count: raw[4],
    })
}

/// Walks a full BOS descriptor into its capability blocks.
pub fn parse_capabilities(raw: &[u8]) -> UsbResult<Vec<Capability>> {
    let info = parse_bos_header(raw)?;

    let mut capabilities = Vec::with_capacity(info.capability_count as usize);
    let end = info.total_length.min(raw.len());
    let mut offset = BOS_HEADER_LENGTH;

    while offset < end {
        // Each block leads with its own length; a block needs at least its
        // three header bytes.
        let length = raw[offset] as usize;
        if length < 3 || offset + length > end {
            return Err(Error::MalformedDescriptor);
        }
        if raw[offset + 1] != DescriptorType::DeviceCapability as u8 {
            return Err(Error::MalformedDescriptor);
        }

        capabilities.push(Capability {
            capability_type: raw[offset + 2],
            data: raw[offset + 3..offset + length].to_vec(),
        });

        offset += length;
    }

    Ok(capabilities)
}

/// Decodes a raw string descriptor's UTF-16LE payload.
pub fn decode_string_descriptor(raw: &[u8]) -> UsbResult<String> {
    if raw.len() < 2 || raw[1] != DescriptorType::String as u8 {
        return Err(Error::MalformedDescriptor);
    }

    let length = (raw[0] as usize).min(raw.len());
    if length < 2 || length % 2 != 0 {
        return Err(Error::MalformedDescriptor);
    }

    let units: Vec<u16> = raw[2..length]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(String::from_utf16_lossy(&units))
}

/// Renders a string as a raw string descriptor, UTF-16LE payload and all.
/// The inverse of [`decode_string_descriptor`]; software backends use this
/// to manufacture their canned descriptors.
pub fn encode_string_descriptor(value: &str) -> Vec<u8> {
    let units: Vec<u16> = value.encode_utf16().collect();

    // Truncate rather than overflow bLength; 126 units is the wire maximum.
    let units = &units[..units.len().min((STRING_BUFFER_LENGTH - 2) / 2)];

    let mut raw = Vec::with_capacity(2 + units.len() * 2);
    raw.push((2 + units.len() * 2) as u8);
    raw.push(DescriptorType::String as u8);
    for unit in units {
        raw.extend_from_slice(&unit.to_le_bytes());
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_string_descriptor() {
        // "AB", as a device would report it.
        let raw = [6, 3, 0x41, 0x00, 0x42, 0x00];
        assert_eq!(decode_string_descriptor(&raw).unwrap(), "AB");
    }

    #[test]
    fn string_descriptor_blength_bounds_the_payload() {
        // bLength claims four bytes; trailing garbage is ignored.
        let raw = [4, 3, 0x41, 0x00, 0xff, 0xff];
        assert_eq!(decode_string_descriptor(&raw).unwrap(), "A");
    }

    #[test]
    fn rejects_malformed_string_descriptors() {
        assert_eq!(
            decode_string_descriptor(&[2]),
            Err(Error::MalformedDescriptor)
        );
        // Wrong descriptor type.
        assert_eq!(
            decode_string_descriptor(&[4, 2, 0x41, 0x00]),
            Err(Error::MalformedDescriptor)
        );
        // Odd payload length.
        assert_eq!(
            decode_string_descriptor(&[5, 3, 0x41, 0x00, 0x42]),
            Err(Error::MalformedDescriptor)
        );
    }

    #[test]
    fn parses_bos_header() {
        let raw = [5, 0x0f, 12, 0, 2];
        assert_eq!(
            parse_bos_header(&raw).unwrap(),
            BosInfo {
                total_length: 12,
                capability_count: 2
            }
        );
    }

    #[test]
    fn walks_capability_blocks() {
        let raw = [
            5, 0x0f, 15, 0, 2, // header: 15 bytes total, two capabilities
            4, 0x10, 0x02, 0xaa, // USB 2.0 extension, one payload byte
            6, 0x10, 0x03, 0x01, 0x02, 0x03, // SuperSpeed, three payload bytes
        ];

        let capabilities = parse_capabilities(&raw).unwrap();
        assert_eq!(capabilities.len(), 2);
        assert_eq!(capabilities[0].capability_type, 0x02);
        assert_eq!(capabilities[0].data, vec![0xaa]);
        assert_eq!(capabilities[1].capability_type, 0x03);
        assert_eq!(capabilities[1].data, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn rejects_truncated_capability_blocks() {
        // Header promises more than the block that follows provides.
        let raw = [5, 0x0f, 10, 0, 1, 8, 0x10, 0x02];
        assert_eq!(parse_capabilities(&raw), Err(Error::MalformedDescriptor));
    }

    #[test]
    fn rejects_non_capability_blocks() {
        let raw = [5, 0x0f, 9, 0, 1, 4, 0x05, 0x02, 0x00];
        assert_eq!(parse_capabilities(&raw), Err(Error::MalformedDescriptor));
    }
}
