// ABOUTME: Error taxonomy for a bind session, split by what went wrong and in which phase
// ABOUTME: Separates "could not reach the SMSC" from "reached it and it refused" for diagnostics

use crate::client::types::SessionState;
use crate::codec::CodecError;
use crate::connection::{ReadError, TransportError};
use crate::datatypes::{CommandId, CommandStatus};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// The session operation an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Bind,
    EnquireLink,
    Unbind,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connect => "connect",
            Phase::Bind => "bind",
            Phase::EnquireLink => "enquire_link",
            Phase::Unbind => "unbind",
        };
        f.write_str(name)
    }
}

/// The peer answered, but not with something this session can accept.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Bytes on the wire did not form a valid PDU
    #[error("malformed PDU: {0}")]
    Codec(#[from] CodecError),

    /// A well-formed PDU arrived with the wrong command_id, e.g. a
    /// generic_nack or a response for another bind mode
    #[error("expected {expected}, received {actual} with status {status}")]
    UnexpectedResponse {
        expected: CommandId,
        actual: CommandId,
        status: CommandStatus,
    },
}

/// Error type for bind session operations
#[derive(Debug, Error)]
pub enum SmppError {
    /// The byte stream failed: never connected, or connected then dropped
    #[error("{phase} failed: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: TransportError,
    },

    /// Malformed header or an unexpected response command_id
    #[error("{phase} failed: {source}")]
    Protocol {
        phase: Phase,
        #[source]
        source: ProtocolError,
    },

    /// Well-formed response carrying a nonzero command_status
    #[error("{phase} rejected by SMSC: {status}")]
    Application { phase: Phase, status: CommandStatus },

    /// Operation not allowed in the session's current state; no I/O was done
    #[error("cannot {phase} while session is {state}")]
    InvalidState { phase: Phase, state: SessionState },
}

/// Result type alias for bind session operations
pub type SmppResult<T> = Result<T, SmppError>;

impl SmppError {
    pub(crate) fn transport(phase: Phase, source: TransportError) -> Self {
        SmppError::Transport { phase, source }
    }

    pub(crate) fn protocol(phase: Phase, source: impl Into<ProtocolError>) -> Self {
        SmppError::Protocol {
            phase,
            source: source.into(),
        }
    }

    pub(crate) fn read(phase: Phase, err: ReadError) -> Self {
        match err {
            ReadError::Transport(source) => SmppError::transport(phase, source),
            ReadError::Codec(source) => SmppError::protocol(phase, source),
        }
    }

    /// Which session operation failed
    pub fn phase(&self) -> Phase {
        match self {
            SmppError::Transport { phase, .. }
            | SmppError::Protocol { phase, .. }
            | SmppError::Application { phase, .. }
            | SmppError::InvalidState { phase, .. } => *phase,
        }
    }

    /// The command_status returned by the SMSC, if it returned a nonzero one
    pub fn status_code(&self) -> Option<u32> {
        match self {
            SmppError::Application { status, .. } => Some(status.code()),
            SmppError::Protocol {
                source: ProtocolError::UnexpectedResponse { status, .. },
                ..
            } if !status.is_ok() => Some(status.code()),
            _ => None,
        }
    }

    /// Short human-readable cause. For SMSC rejections this is the status
    /// description, e.g. "Invalid Password".
    pub fn description(&self) -> Cow<'static, str> {
        match self {
            SmppError::Application { status, .. } => status.description(),
            SmppError::Transport { source, .. } => Cow::Owned(source.to_string()),
            SmppError::Protocol { source, .. } => Cow::Owned(source.to_string()),
            SmppError::InvalidState { state, .. } => Cow::Owned(format!("session is {state}")),
        }
    }

    /// True when the SMSC was never reached: connect timed out or failed
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            SmppError::Transport {
                source: TransportError::ConnectTimeout { .. } | TransportError::ConnectFailed { .. },
                ..
            }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SmppError::Transport {
                source: TransportError::ConnectTimeout { .. },
                ..
            }
        )
    }
}
