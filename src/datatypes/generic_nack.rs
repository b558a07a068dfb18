use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

/// GenericNack is sent by an SMSC when it cannot process a PDU at all, for
/// example an unsupported bind command_id or a malformed header. The
/// command_status field carries the reason.
///
/// The generic_nack PDU has no message body and only contains the standard
/// SMPP header.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericNack {
    pub command_status: CommandStatus,
    /// The sequence_number from the offending PDU, or 0 if it could not be
    /// determined.
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(GenericNack, CommandId::GenericNack);
