// SMPP v3.4 Codec - wire format for the PDUs of a bind / enquire_link / unbind
// session.
//
// Every multi-byte integer on the wire is big-endian. This module is the only
// place that converts between wire order and host order; PDU types describe
// their fields and implement Encodable/Decodable on top of these helpers.

use crate::datatypes::{CommandId, CommandStatus, FixedString};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Largest command_length accepted from a peer
pub const MAX_PDU_SIZE: u32 = 65535;

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Decode a PDU header from the first 16 bytes of `buf`.
    ///
    /// A header whose command_length lies outside `[16, 65535]` is rejected
    /// here, before the caller reads any body bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < Self::SIZE {
            return Err(CodecError::Incomplete);
        }

        let mut buf = &buf[..Self::SIZE];
        let command_length = buf.get_u32();
        validate_command_length(command_length)?;

        Ok(PduHeader {
            command_length,
            command_id: CommandId::from(buf.get_u32()),
            command_status: CommandStatus::from(buf.get_u32()),
            sequence_number: buf.get_u32(),
        })
    }

    /// Encode PDU header to buffer
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id.into());
        buf.put_u32(self.command_status.into());
        buf.put_u32(self.sequence_number);
    }

    /// Number of body bytes that follow this header on the wire
    pub fn body_len(&self) -> usize {
        (self.command_length as usize).saturating_sub(Self::SIZE)
    }
}

/// Rejects command_length values that cannot describe a valid PDU.
pub fn validate_command_length(command_length: u32) -> Result<(), CodecError> {
    if !(PduHeader::SIZE as u32..=MAX_PDU_SIZE).contains(&command_length) {
        return Err(CodecError::InvalidPduLength {
            length: command_length,
            min: PduHeader::SIZE as u32,
            max: MAX_PDU_SIZE,
        });
    }
    Ok(())
}

/// Build the 16-byte header for a PDU whose body is `body_len` bytes long.
pub fn encode_header(
    command_id: CommandId,
    command_status: CommandStatus,
    sequence_number: u32,
    body_len: usize,
) -> [u8; PduHeader::SIZE] {
    let command_length = (PduHeader::SIZE + body_len) as u32;

    let mut header = [0u8; PduHeader::SIZE];
    let mut buf = &mut header[..];
    buf.put_u32(command_length);
    buf.put_u32(command_id.into());
    buf.put_u32(command_status.into());
    buf.put_u32(sequence_number);
    header
}

/// A complete PDU as read from the wire: decoded header plus raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub header: PduHeader,
    pub body: Bytes,
}

impl Pdu {
    pub fn command_id(&self) -> CommandId {
        self.header.command_id
    }

    pub fn command_status(&self) -> CommandStatus {
        self.header.command_status
    }

    pub fn sequence_number(&self) -> u32 {
        self.header.sequence_number
    }

    /// Decode the body into a typed PDU
    pub fn parse<T: Decodable>(&self) -> Result<T, CodecError> {
        let mut cursor = Cursor::new(self.body.as_ref());
        T::decode(self.header, &mut cursor)
    }
}

/// Trait for types that can be encoded to bytes
pub trait Encodable {
    fn command_id(&self) -> CommandId;

    fn sequence_number(&self) -> u32;

    /// Requests always carry a NULL command_status
    fn command_status(&self) -> CommandStatus {
        CommandStatus::Ok
    }

    /// Write the body (everything after the header). Header-only PDUs keep
    /// the default.
    fn encode_body(&self, _buf: &mut BytesMut) {}

    /// Header plus body, with command_length filled in
    fn to_bytes(&self) -> Bytes {
        let mut body = BytesMut::new();
        self.encode_body(&mut body);

        let mut buf = BytesMut::with_capacity(PduHeader::SIZE + body.len());
        buf.put_slice(&encode_header(
            self.command_id(),
            self.command_status(),
            self.sequence_number(),
            body.len(),
        ));
        buf.extend_from_slice(&body);
        buf.freeze()
    }

    fn encoded_size(&self) -> usize {
        let mut body = BytesMut::new();
        self.encode_body(&mut body);
        PduHeader::SIZE + body.len()
    }
}

/// Trait for types that can be decoded from bytes
pub trait Decodable: Sized {
    /// Decode this PDU from the body that follows `header`
    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;
}

/// Checks that a header carries the command_id a decoder expects
pub fn expect_command_id(header: &PduHeader, expected: CommandId) -> Result<(), CodecError> {
    if header.command_id != expected {
        return Err(CodecError::UnexpectedCommandId {
            expected,
            actual: header.command_id,
        });
    }
    Ok(())
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete PDU: need more data")]
    Incomplete,

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Unexpected command_id: expected {expected}, got {actual}")]
    UnexpectedCommandId {
        expected: CommandId,
        actual: CommandId,
    },

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8Error {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Write a fixed-width text field (always exactly `N` bytes)
pub fn encode_fixed<const N: usize>(buf: &mut BytesMut, value: &FixedString<N>) {
    buf.put_slice(value.as_bytes());
}

/// Read a fixed-width text field of exactly `N` bytes
pub fn decode_fixed<const N: usize>(buf: &mut Cursor<&[u8]>) -> Result<FixedString<N>, CodecError> {
    if buf.remaining() < N {
        return Err(CodecError::Incomplete);
    }
    let mut field = [0u8; N];
    buf.copy_to_slice(&mut field);
    Ok(FixedString::from_wire(&field))
}

/// Read a variable-length null-terminated string of at most `max_len` bytes
/// including the terminator. A field cut short by the end of the body is
/// accepted as-is.
pub fn decode_cstring(
    buf: &mut Cursor<&[u8]>,
    max_len: usize,
    field_name: &'static str,
) -> Result<String, CodecError> {
    let available = buf.chunk();
    let (content, consumed) = match available.iter().position(|&b| b == 0) {
        Some(end) => (&available[..end], end + 1),
        None => (available, available.len()),
    };

    if content.len() >= max_len {
        return Err(CodecError::FieldValidation {
            field: field_name,
            reason: format!(
                "{} bytes exceeds maximum of {}",
                content.len(),
                max_len - 1
            ),
        });
    }

    let value = String::from_utf8(content.to_vec()).map_err(|e| CodecError::Utf8Error {
        field: field_name,
        source: e,
    })?;
    buf.advance(consumed);
    Ok(value)
}

/// Decode a single byte
pub fn decode_u8(buf: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::SystemId;

    fn raw_header(command_length: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&command_length.to_be_bytes());
        data.extend_from_slice(&0x8000_0009u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data
    }

    #[test]
    fn encode_header_is_big_endian() {
        let header = encode_header(CommandId::EnquireLink, CommandStatus::Ok, 0x0102_0304, 0);
        assert_eq!(
            header,
            [
                0x00, 0x00, 0x00, 0x10, // command_length
                0x00, 0x00, 0x00, 0x15, // command_id
                0x00, 0x00, 0x00, 0x00, // command_status
                0x01, 0x02, 0x03, 0x04, // sequence_number
            ]
        );
    }

    #[test]
    fn encode_header_counts_body() {
        let header = encode_header(CommandId::BindTransceiver, CommandStatus::Ok, 1, 82);
        assert_eq!(&header[..4], &98u32.to_be_bytes());
    }

    #[test]
    fn pdu_header_encode_decode() {
        let header = PduHeader {
            command_length: 24,
            command_id: CommandId::EnquireLink,
            command_status: CommandStatus::Ok,
            sequence_number: 42,
        };

        let mut buf = BytesMut::new();
        header.encode(&mut buf);

        let decoded = PduHeader::decode(&buf).unwrap();
        assert_eq!(header, decoded);
        assert_eq!(decoded.body_len(), 8);
    }

    #[test]
    fn header_decodes_unknown_id_and_status() {
        let mut data = Vec::new();
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(&0x8000_0004u32.to_be_bytes());
        data.extend_from_slice(&0x0000_0400u32.to_be_bytes());
        data.extend_from_slice(&7u32.to_be_bytes());

        let header = PduHeader::decode(&data).unwrap();
        assert_eq!(header.command_id, CommandId::Other(0x8000_0004));
        assert_eq!(header.command_status, CommandStatus::Other(0x400));
        assert_eq!(header.sequence_number, 7);
    }

    #[test]
    fn header_rejects_out_of_range_lengths() {
        for length in [0u32, 15, 65536, u32::MAX] {
            let result = PduHeader::decode(&raw_header(length));
            assert!(
                matches!(result, Err(CodecError::InvalidPduLength { length: l, .. }) if l == length),
                "length {length} should be rejected"
            );
        }
    }

    #[test]
    fn header_accepts_boundary_lengths() {
        assert!(PduHeader::decode(&raw_header(16)).is_ok());
        assert!(PduHeader::decode(&raw_header(65535)).is_ok());
    }

    #[test]
    fn header_needs_sixteen_bytes() {
        let data = raw_header(16);
        assert!(matches!(
            PduHeader::decode(&data[..15]),
            Err(CodecError::Incomplete)
        ));
    }

    #[test]
    fn fixed_field_round_trip() {
        let mut buf = BytesMut::new();
        encode_fixed(&mut buf, &SystemId::from("hello"));
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[..6], b"hello\0");

        let mut cursor = Cursor::new(buf.as_ref());
        let decoded: SystemId = decode_fixed(&mut cursor).unwrap();
        assert_eq!(decoded, "hello");
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn decode_fixed_short_buffer() {
        let data = [0u8; 8];
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            decode_fixed::<16>(&mut cursor),
            Err(CodecError::Incomplete)
        ));
    }

    #[test]
    fn decode_cstring_normal() {
        let data = b"SMSC\0\x02\x10";
        let mut cursor = Cursor::new(&data[..]);
        let result = decode_cstring(&mut cursor, 16, "system_id").unwrap();
        assert_eq!(result, "SMSC");
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn decode_cstring_unterminated_at_end() {
        let data = b"SMSC";
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(decode_cstring(&mut cursor, 16, "system_id").unwrap(), "SMSC");
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn decode_cstring_too_long() {
        let data = b"0123456789ABCDEF\0";
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            decode_cstring(&mut cursor, 16, "system_id"),
            Err(CodecError::FieldValidation { field: "system_id", .. })
        ));
    }

    #[test]
    fn expect_command_id_mismatch() {
        let header = PduHeader::decode(&raw_header(16)).unwrap();
        assert!(expect_command_id(&header, CommandId::BindTransceiverResp).is_ok());
        assert!(matches!(
            expect_command_id(&header, CommandId::BindTransmitterResp),
            Err(CodecError::UnexpectedCommandId { .. })
        ));
    }
}
