// ABOUTME: The three SMPP bind roles and their request/response command_id pairs
// ABOUTME: Parsed from CLI strings such as "tx", "receiver" or "trx"

use crate::datatypes::CommandId;
use std::fmt;
use std::str::FromStr;

/// Role an ESME requests when binding to the SMSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindMode {
    /// Bind as transmitter (can send submit_sm)
    Transmitter,
    /// Bind as receiver (can receive deliver_sm)
    Receiver,
    /// Bind as transceiver (both transmitter and receiver capabilities)
    #[default]
    Transceiver,
}

impl BindMode {
    pub const ALL: [BindMode; 3] = [
        BindMode::Transmitter,
        BindMode::Receiver,
        BindMode::Transceiver,
    ];

    /// command_id of the bind request sent for this mode
    pub fn request_id(self) -> CommandId {
        self.command_ids().0
    }

    /// command_id the SMSC must answer with for this mode
    pub fn response_id(self) -> CommandId {
        self.command_ids().1
    }

    fn command_ids(self) -> (CommandId, CommandId) {
        match self {
            BindMode::Transmitter => (CommandId::BindTransmitter, CommandId::BindTransmitterResp),
            BindMode::Receiver => (CommandId::BindReceiver, CommandId::BindReceiverResp),
            BindMode::Transceiver => (CommandId::BindTransceiver, CommandId::BindTransceiverResp),
        }
    }

    /// Mode whose bind request carries `command_id`, if any
    pub fn from_request_id(command_id: CommandId) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.request_id() == command_id)
    }

    /// Mode whose bind response carries `command_id`, if any
    pub fn from_response_id(command_id: CommandId) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.response_id() == command_id)
    }
}

impl fmt::Display for BindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindMode::Transmitter => "transmitter",
            BindMode::Receiver => "receiver",
            BindMode::Transceiver => "transceiver",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bind mode '{0}' (expected transmitter|tx, receiver|rx or transceiver|trx)")]
pub struct ParseBindModeError(String);

impl FromStr for BindMode {
    type Err = ParseBindModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transmitter" | "tx" => Ok(BindMode::Transmitter),
            "receiver" | "rx" => Ok(BindMode::Receiver),
            "transceiver" | "trx" => Ok(BindMode::Transceiver),
            _ => Err(ParseBindModeError(s.to_string())),
        }
    }
}
