// ABOUTME: Bind session state machine: connect + bind, enquire_link heartbeat, unbind + close
// ABOUTME: Owns the transport and the sequence counter for exactly one session lifecycle

use crate::client::error::{Phase, ProtocolError, SmppError, SmppResult};
use crate::client::types::{SessionConfig, SessionState};
use crate::codec::{Encodable, Pdu, PduHeader};
use crate::connection::{Connection, Connector, TcpConnector, TransportError};
use crate::datatypes::{Bind, BindMode, BindResponse, CommandId, EnquireLink, Unbind};
use std::io::Cursor;
use tracing::{debug, info, warn};

/// One SMPP session against an SMSC.
///
/// The session moves through `Unbound → Binding → Bound → Unbinding → Closed`.
/// `connect` binds, `test_connection` sends a heartbeat on a bound session,
/// and `disconnect` always releases the transport. Every PDU sent takes the
/// next sequence number, starting at 1.
///
/// Reads of the bind and enquire_link responses have no timeout; a peer that
/// accepts the connection but never answers blocks the caller.
///
/// ```rust,no_run
/// use smpp_tester::client::{BindCredentials, BindSession, SessionConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::new(
///     "localhost",
///     2775,
///     BindCredentials::transceiver("system_id", "password"),
/// );
/// let mut session = BindSession::new(config);
///
/// session.connect().await?;
/// session.test_connection().await?;
/// session.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct BindSession<C: Connector = TcpConnector> {
    config: SessionConfig,
    connector: C,
    connection: Option<Connection<C::Stream>>,
    state: SessionState,
    /// Sequence number the next outgoing PDU will carry
    sequence_number: u32,
    smsc_system_id: Option<String>,
}

impl BindSession<TcpConnector> {
    /// A session that connects over TCP to `config.host:config.port`
    pub fn new(config: SessionConfig) -> Self {
        let connector = TcpConnector::new(config.host.clone(), config.port);
        BindSession::with_connector(config, connector)
    }
}

impl<C: Connector> BindSession<C> {
    /// A session that opens its transport through `connector`. The host and
    /// port in `config` are then only used for logging.
    pub fn with_connector(config: SessionConfig, connector: C) -> Self {
        BindSession {
            config,
            connector,
            connection: None,
            state: SessionState::Unbound,
            sequence_number: 1,
            smsc_system_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> BindMode {
        self.config.mode()
    }

    pub fn is_bound(&self) -> bool {
        self.state == SessionState::Bound
    }

    /// Sequence number the next PDU will be sent with
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// system_id reported by the SMSC in its bind response
    pub fn smsc_system_id(&self) -> Option<&str> {
        self.smsc_system_id.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Take the current sequence number and advance the counter. Wraps past
    /// `u32::MAX` to 1; 0 is never used.
    fn next_sequence_number(&mut self) -> u32 {
        let current = self.sequence_number;
        self.sequence_number = match current.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        current
    }

    /// Open the transport and bind in the configured mode.
    ///
    /// Only allowed while `Unbound`. If the transport cannot be opened the
    /// session becomes `Closed` and no bind is sent. If the bind is refused
    /// or answered with anything other than this mode's response, the
    /// transport is closed and the session returns to `Unbound`.
    pub async fn connect(&mut self) -> SmppResult<()> {
        if self.state != SessionState::Unbound {
            return Err(SmppError::InvalidState {
                phase: Phase::Connect,
                state: self.state,
            });
        }

        self.state = SessionState::Binding;
        info!(
            peer = %self.config.address(),
            mode = %self.mode(),
            timeout_ms = self.config.connect_timeout.as_millis() as u64,
            "connecting"
        );

        let connection = match Connection::connect(&self.connector, self.config.connect_timeout).await
        {
            Ok(connection) => connection,
            Err(source) => {
                warn!(peer = %self.config.address(), "connect failed: {source}");
                self.state = SessionState::Closed;
                return Err(SmppError::transport(Phase::Connect, source));
            }
        };
        self.connection = Some(connection);

        match self.bind().await {
            Ok(system_id) => {
                info!(mode = %self.mode(), smsc_system_id = %system_id, "bound");
                self.smsc_system_id = Some(system_id);
                self.state = SessionState::Bound;
                Ok(())
            }
            Err(e) => {
                warn!(mode = %self.mode(), "bind failed: {e}");
                self.close_transport().await;
                self.state = SessionState::Unbound;
                Err(e)
            }
        }
    }

    /// Send the bind request and validate the response. Returns the SMSC's
    /// system_id.
    async fn bind(&mut self) -> SmppResult<String> {
        let mode = self.mode();
        let sequence_number = self.next_sequence_number();
        let bind = Bind::new(
            mode,
            sequence_number,
            &self.config.credentials.system_id,
            &self.config.credentials.password,
        );

        let response = self.exchange(Phase::Bind, &bind).await?;
        expect_response(Phase::Bind, &response, mode.response_id())?;

        // Success is decided by command_id and status alone; a body that does
        // not decode only loses the SMSC's system_id
        let mut body = Cursor::new(response.body.as_ref());
        match BindResponse::decode_for(mode, response.header, &mut body) {
            Ok(decoded) => Ok(decoded.system_id),
            Err(e) => {
                warn!("could not decode bind response body: {e}");
                Ok(String::new())
            }
        }
    }

    /// Send an enquire_link and wait for its response.
    ///
    /// Only allowed while `Bound`; otherwise fails without touching the
    /// transport. The session state is unchanged whatever the outcome.
    pub async fn test_connection(&mut self) -> SmppResult<()> {
        if self.state != SessionState::Bound {
            return Err(SmppError::InvalidState {
                phase: Phase::EnquireLink,
                state: self.state,
            });
        }

        let enquire_link = EnquireLink::new(self.next_sequence_number());
        let response = self.exchange(Phase::EnquireLink, &enquire_link).await?;
        expect_response(Phase::EnquireLink, &response, CommandId::EnquireLinkResp)?;

        info!("enquire_link acknowledged");
        Ok(())
    }

    /// Unbind if bound, then close the transport. Never fails and may be
    /// called any number of times, in any state.
    ///
    /// The unbind reply is awaited for at most the configured grace period
    /// and is not validated. Errors while unbinding are logged and dropped.
    pub async fn disconnect(&mut self) {
        if self.state == SessionState::Bound {
            self.state = SessionState::Unbinding;
            info!("unbinding");
            if let Err(e) = self.unbind().await {
                warn!("unbind failed, closing anyway: {e}");
            }
        }

        self.close_transport().await;
        if self.state != SessionState::Closed {
            info!("session closed");
            self.state = SessionState::Closed;
        }
    }

    async fn unbind(&mut self) -> SmppResult<()> {
        let unbind = Unbind::new(self.next_sequence_number());
        let grace = self.config.unbind_grace;
        let connection = self.connection_mut(Phase::Unbind)?;

        debug!(command_id = %unbind.command_id(), sequence_number = unbind.sequence_number, "sending");
        connection
            .write_pdu(&unbind)
            .await
            .map_err(|source| SmppError::transport(Phase::Unbind, source))?;

        match tokio::time::timeout(grace, connection.read_pdu()).await {
            Ok(Ok(Some(reply))) => debug!(
                command_id = %reply.command_id(),
                command_status = %reply.command_status(),
                sequence_number = reply.sequence_number(),
                "unbind reply"
            ),
            Ok(Ok(None)) => debug!("peer closed without replying to unbind"),
            Ok(Err(e)) => return Err(SmppError::read(Phase::Unbind, e)),
            Err(_elapsed) => debug!(grace_ms = grace.as_millis() as u64, "no unbind reply"),
        }
        Ok(())
    }

    /// Write one request and read the next PDU from the peer
    async fn exchange<P: Encodable>(&mut self, phase: Phase, request: &P) -> SmppResult<Pdu> {
        let connection = self.connection_mut(phase)?;

        debug!(
            command_id = %request.command_id(),
            sequence_number = request.sequence_number(),
            "sending"
        );
        connection
            .write_pdu(request)
            .await
            .map_err(|source| SmppError::transport(phase, source))?;

        let response = match connection.read_pdu().await {
            Ok(Some(pdu)) => pdu,
            Ok(None) => {
                return Err(SmppError::transport(
                    phase,
                    TransportError::ConnectionClosed {
                        expected: PduHeader::SIZE,
                        received: 0,
                    },
                ));
            }
            Err(e) => return Err(SmppError::read(phase, e)),
        };

        debug!(
            command_id = %response.command_id(),
            command_status = %response.command_status(),
            sequence_number = response.sequence_number(),
            "received"
        );
        if response.sequence_number() != request.sequence_number() {
            warn!(
                expected = request.sequence_number(),
                actual = response.sequence_number(),
                "response sequence_number does not match request"
            );
        }
        Ok(response)
    }

    fn connection_mut(&mut self, phase: Phase) -> SmppResult<&mut Connection<C::Stream>> {
        self.connection
            .as_mut()
            .ok_or_else(|| SmppError::transport(phase, TransportError::NotConnected))
    }

    async fn close_transport(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }
    }
}

/// A response must carry the expected command_id and a zero status. A wrong
/// command_id is a protocol error even when the status is zero.
fn expect_response(phase: Phase, response: &Pdu, expected: CommandId) -> SmppResult<()> {
    if response.command_id() != expected {
        return Err(SmppError::protocol(
            phase,
            ProtocolError::UnexpectedResponse {
                expected,
                actual: response.command_id(),
                status: response.command_status(),
            },
        ));
    }
    if !response.command_status().is_ok() {
        return Err(SmppError::Application {
            phase,
            status: response.command_status(),
        });
    }
    Ok(())
}
