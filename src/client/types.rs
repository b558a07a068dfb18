// ABOUTME: Inputs and lifecycle state of a bind session
// ABOUTME: Credentials select the bind mode; SessionConfig adds the target and timeouts

use crate::datatypes::BindMode;
use std::fmt;
use std::time::Duration;

/// Connect timeout used when none is configured
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// How long `disconnect` waits for an unbind reply when none is configured
pub const DEFAULT_UNBIND_GRACE: Duration = Duration::from_millis(1_000);

/// SMPP bind credentials
///
/// Contains the authentication information and the bind mode to request.
/// Values longer than their wire fields (15 bytes for system_id, 8 for
/// password) are truncated when the bind PDU is built.
#[derive(Clone, PartialEq, Eq)]
pub struct BindCredentials {
    /// System identifier for authentication
    pub system_id: String,
    /// Password for authentication
    pub password: String,
    /// Type of bind operation to perform
    pub mode: BindMode,
}

impl BindCredentials {
    pub fn new(mode: BindMode, system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            mode,
        }
    }

    /// Create new bind credentials for transmitter session
    pub fn transmitter(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindMode::Transmitter, system_id, password)
    }

    /// Create new bind credentials for receiver session
    pub fn receiver(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindMode::Receiver, system_id, password)
    }

    /// Create new bind credentials for transceiver session
    pub fn transceiver(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindMode::Transceiver, system_id, password)
    }

    /// The password with every character replaced by `*`, for display
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

// Keeps the password out of logs
impl fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindCredentials")
            .field("system_id", &self.system_id)
            .field("password", &self.masked_password())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Everything a `BindSession` needs to run one lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub credentials: BindCredentials,
    /// Upper bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Upper bound on waiting for a reply to unbind
    pub unbind_grace: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16, credentials: BindCredentials) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            unbind_grace: DEFAULT_UNBIND_GRACE,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_unbind_grace(mut self, grace: Duration) -> Self {
        self.unbind_grace = grace;
        self
    }

    pub fn mode(&self) -> BindMode {
        self.credentials.mode
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Lifecycle of a bind session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No bind in effect; a connect may be attempted
    #[default]
    Unbound,
    /// Transport is being opened or the bind response is awaited
    Binding,
    Bound,
    /// unbind sent, transport about to close
    Unbinding,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unbound => "unbound",
            SessionState::Binding => "binding",
            SessionState::Bound => "bound",
            SessionState::Unbinding => "unbinding",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
