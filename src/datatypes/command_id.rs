use num_enum::{FromPrimitive, IntoPrimitive};

/// The command_id field of the SMPP header. Only the PDUs exchanged during a
/// bind / enquire_link / unbind lifecycle are named; anything else decodes to
/// `Other` so an unexpected PDU from the SMSC can still be reported.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    GenericNack = 0x8000_0000,
    BindTransmitter = 0x0000_0001,
    BindTransmitterResp = 0x8000_0001,
    BindReceiver = 0x0000_0002,
    BindReceiverResp = 0x8000_0002,
    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,
    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,
    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,
    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandId {
    /// Check if this command_id represents a response PDU
    pub fn is_response(&self) -> bool {
        u32::from(*self) & 0x8000_0000 != 0
    }

    /// The raw wire value
    pub fn value(&self) -> u32 {
        u32::from(*self)
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandId::GenericNack => "generic_nack",
            CommandId::BindReceiver => "bind_receiver",
            CommandId::BindReceiverResp => "bind_receiver_resp",
            CommandId::BindTransmitter => "bind_transmitter",
            CommandId::BindTransmitterResp => "bind_transmitter_resp",
            CommandId::Unbind => "unbind",
            CommandId::UnbindResp => "unbind_resp",
            CommandId::BindTransceiver => "bind_transceiver",
            CommandId::BindTransceiverResp => "bind_transceiver_resp",
            CommandId::EnquireLink => "enquire_link",
            CommandId::EnquireLinkResp => "enquire_link_resp",
            CommandId::Other(raw) => return write!(f, "command_id {raw:#010x}"),
        };
        write!(f, "{name} ({:#010x})", self.value())
    }
}
