use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

/// enquire_link: liveness check valid on a bound session. Header only.
#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLink {
    // EnquireLink always sets the command status to NULL
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

/// enquire_link_resp: answer to an enquire_link, echoing its sequence_number.
#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLinkResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(EnquireLink, CommandId::EnquireLink);
impl_complete_header_only_pdu!(EnquireLinkResponse, CommandId::EnquireLinkResp);
