//! SMPP v3.4 connectivity testing.
//!
//! Binds to an SMSC in one of the three bind modes, checks the link with an
//! enquire_link heartbeat, and unbinds. The pieces, leaves first:
//!
//! * [`datatypes`] - command ids, status codes, bind modes and the PDUs used
//!   by a bind session
//! * [`codec`] - the 16-byte header and the `Encodable` / `Decodable` traits
//! * [`connection`] - timeout-bounded connect and exact-length PDU reads
//! * [`client`] - the `BindSession` state machine
//!
//! ```rust,no_run
//! use smpp_tester::{BindCredentials, BindSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig::new("localhost", 2775, BindCredentials::transceiver("id", "pw"));
//!     let mut session = BindSession::new(config);
//!
//!     if let Err(e) = session.connect().await {
//!         eprintln!("{e}");
//!     } else if let Err(e) = session.test_connection().await {
//!         eprintln!("heartbeat: {e}");
//!     }
//!
//!     session.disconnect().await;
//! }
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
mod macros;

#[cfg(test)]
mod testing;

// Re-export codec types for direct access
pub use codec::{CodecError, Decodable, Encodable, Pdu, PduHeader};

// Re-export the main client API for easy access
pub use client::{
    BindCredentials, BindSession, Phase, SessionConfig, SessionState, SmppError, SmppResult,
};
pub use connection::{Connection, Connector, TcpConnector, TransportError};
pub use datatypes::{describe, BindMode, CommandStatus};
