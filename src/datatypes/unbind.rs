use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

/// The purpose of the SMPP unbind operation is to deregister an instance of an ESME from the SMSC
/// and inform the SMSC that the ESME no longer wishes to use this network connection for the
/// submission or delivery of messages.
///
/// Thus, the unbind operation may be viewed as a form of SMSC logoff request to close the current
/// SMPP session.
#[derive(Clone, Debug, PartialEq)]
pub struct Unbind {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnbindResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(Unbind, CommandId::Unbind);
impl_complete_header_only_pdu!(UnbindResponse, CommandId::UnbindResp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decodable, Encodable, PduHeader};
    use std::io::Cursor;

    #[test]
    fn unbind_to_bytes() {
        let bytes = Unbind::new(3).to_bytes();

        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x10, // command_length
            0x00, 0x00, 0x00, 0x06, // command_id
            0x00, 0x00, 0x00, 0x00, // command_status
            0x00, 0x00, 0x00, 0x03, // sequence_number
        ];
        assert_eq!(&bytes, &expected);
        assert_eq!(Unbind::new(3).encoded_size(), 16);
    }

    #[test]
    fn unbind_response_roundtrip() {
        let original = UnbindResponse::new(3);

        let encoded = original.to_bytes();
        let header = PduHeader::decode(&encoded).unwrap();
        assert_eq!(header.command_id, CommandId::UnbindResp);
        let mut cursor = Cursor::new(&encoded[PduHeader::SIZE..]);
        let decoded = UnbindResponse::decode(header, &mut cursor).unwrap();

        assert_eq!(original, decoded);
    }
}
