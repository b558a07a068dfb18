// ABOUTME: SMPP client module: a single bind session used to check an SMSC
// ABOUTME: Exports the session state machine, its configuration types, and error taxonomy

//! SMPP Client Module
//!
//! A `BindSession` runs one lifecycle against an SMSC:
//!
//! * **connect** - open TCP within a timeout, then bind as transmitter,
//!   receiver or transceiver
//! * **test_connection** - enquire_link heartbeat on a bound session
//! * **disconnect** - best-effort unbind, then always close the transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smpp_tester::client::{BindCredentials, BindSession, SessionConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = SessionConfig::new("localhost", 2775, BindCredentials::transmitter("id", "pass"))
//!     .with_connect_timeout(Duration::from_secs(5));
//!
//! let mut session = BindSession::new(config);
//! match session.connect().await {
//!     Ok(()) => println!("bound to {:?}", session.smsc_system_id()),
//!     Err(e) => println!("{} failed: {}", e.phase(), e.description()),
//! }
//! session.disconnect().await;
//! # }
//! ```

pub mod error;
pub mod session;
pub mod types;

pub use error::{Phase, ProtocolError, SmppError, SmppResult};
pub use session::BindSession;
pub use types::{
    BindCredentials, SessionConfig, SessionState, DEFAULT_CONNECT_TIMEOUT, DEFAULT_UNBIND_GRACE,
};
