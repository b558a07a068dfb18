// ABOUTME: Transport layer for an SMPP session: timeout-bounded connect and exact-length PDU reads
// ABOUTME: The stream type is pluggable through Connector so sessions can run over TCP or in-memory pipes

use crate::codec::{CodecError, Encodable, Pdu, PduHeader};
use bytes::{Bytes, BytesMut};
use std::future::Future;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// Opens the byte stream a session runs over.
///
/// `TcpConnector` is the production implementation; anything that yields an
/// `AsyncRead + AsyncWrite` stream can stand in for it.
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Human-readable description of the remote end, used in logs and errors
    fn peer(&self) -> String;

    /// Start a connection attempt. The returned future may be dropped before
    /// it completes; dropping it must release any half-open socket.
    fn connect(&self) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Connects to an SMSC over TCP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConnector {
    pub host: String,
    pub port: u16,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn peer(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn connect(&self) -> io::Result<TcpStream> {
        // Resolves the host name, then tries each address in turn
        TcpStream::connect((self.host.as_str(), self.port)).await
    }
}

/// Failures of the byte stream itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connect attempt did not finish before the deadline
    #[error("timed out after {} ms connecting to {peer}", timeout.as_millis())]
    ConnectTimeout { peer: String, timeout: Duration },

    /// Refused, unreachable, or the host name did not resolve
    #[error("could not connect to {peer}: {source}")]
    ConnectFailed {
        peer: String,
        #[source]
        source: io::Error,
    },

    /// The peer closed the stream before `expected` bytes arrived
    #[error("connection closed by peer after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("transport is not connected")]
    NotConnected,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure to read one PDU: either the stream broke or the bytes did not
/// form a valid frame.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// One SMPP transport connection.
///
/// Handles PDU-level reads and writes over a single stream. It does not track
/// session state; `BindSession` owns the protocol state machine and decides
/// which PDUs are sent when.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    // The stream is decorated with a `BufWriter` so each PDU goes out in a
    // single write. `None` once the connection has been closed.
    stream: Option<BufWriter<S>>,

    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-connected stream
    pub fn new(stream: S, peer: impl Into<String>) -> Connection<S> {
        Connection {
            stream: Some(BufWriter::new(stream)),
            peer: peer.into(),
        }
    }

    /// Open a connection through `connector`, giving up after `timeout`.
    ///
    /// The connect attempt races a timer. If the timer wins, the in-flight
    /// connect future is dropped, which closes the socket it was opening.
    pub async fn connect<C>(connector: &C, timeout: Duration) -> Result<Self, TransportError>
    where
        C: Connector<Stream = S>,
    {
        let peer = connector.peer();
        debug!(%peer, timeout_ms = timeout.as_millis() as u64, "opening transport");

        match tokio::time::timeout(timeout, connector.connect()).await {
            Ok(Ok(stream)) => Ok(Connection::new(stream, peer)),
            Ok(Err(source)) => Err(TransportError::ConnectFailed { peer, source }),
            Err(_elapsed) => Err(TransportError::ConnectTimeout { peer, timeout }),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Read exactly `n` bytes.
    ///
    /// Loops over short reads. If the peer closes first, fails with
    /// `ConnectionClosed` reporting how many bytes did arrive.
    pub async fn read_exact(&mut self, n: usize) -> Result<Bytes, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let mut buf = BytesMut::zeroed(n);
        let mut received = 0;
        while received < n {
            let read = stream.read(&mut buf[received..]).await?;
            if read == 0 {
                return Err(TransportError::ConnectionClosed {
                    expected: n,
                    received,
                });
            }
            received += read;
        }
        Ok(buf.freeze())
    }

    /// Read a single PDU from the stream.
    ///
    /// # Returns
    ///
    /// On success, the received PDU is returned. If the peer closed the
    /// stream before sending any byte of a new PDU, returns `None`. A close
    /// part-way through a PDU is a `ConnectionClosed` error, and a header
    /// with an out-of-range command_length is rejected before any body bytes
    /// are read.
    pub async fn read_pdu(&mut self) -> Result<Option<Pdu>, ReadError> {
        let header_bytes = match self.read_exact(PduHeader::SIZE).await {
            Ok(bytes) => bytes,
            Err(TransportError::ConnectionClosed { received: 0, .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header = PduHeader::decode(&header_bytes)?;

        let body = match header.body_len() {
            0 => Bytes::new(),
            len => self.read_exact(len).await?,
        };

        trace!(
            command_id = %header.command_id,
            sequence_number = header.sequence_number,
            command_length = header.command_length,
            "<- pdu"
        );
        Ok(Some(Pdu { header, body }))
    }

    /// Write raw bytes and flush them to the stream
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Encode and write a single PDU
    pub async fn write_pdu<P: Encodable>(&mut self, pdu: &P) -> Result<(), TransportError> {
        trace!(
            command_id = %pdu.command_id(),
            sequence_number = pdu.sequence_number(),
            "-> pdu"
        );
        self.write_all(&pdu.to_bytes()).await
    }

    /// Close the stream. Safe to call any number of times; errors while
    /// shutting down are ignored because the stream is released regardless.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(peer = %self.peer, "error shutting down transport: {e}");
            }
            debug!(peer = %self.peer, "transport closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::datatypes::{CommandId, CommandStatus, EnquireLink};
    use crate::testing::{DuplexConnector, PendingConnector, RefusingConnector};
    use tokio::io::duplex;

    #[tokio::test(start_paused = true)]
    async fn connect_times_out() {
        let connector = PendingConnector::default();
        let result = Connection::connect(&connector, Duration::from_millis(250)).await;

        match result {
            Err(TransportError::ConnectTimeout { peer, timeout }) => {
                assert_eq!(peer, "pending");
                assert_eq!(timeout, Duration::from_millis(250));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn connect_refused() {
        let result = Connection::connect(&RefusingConnector, Duration::from_secs(1)).await;
        match result {
            Err(TransportError::ConnectFailed { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_success() {
        let (connector, _server) = DuplexConnector::pair();
        let connection = Connection::connect(&connector, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(connection.is_open());
        assert_eq!(connection.peer(), "duplex");
    }

    #[tokio::test]
    async fn read_exact_collects_fragments() {
        let (client, mut server) = duplex(64);
        let mut connection = Connection::new(client, "test");

        let writer = tokio::spawn(async move {
            for chunk in [&b"he"[..], b"ll", b"o"] {
                server.write_all(chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
            server
        });

        let bytes = connection.read_exact(5).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn read_exact_reports_peer_close() {
        let (client, mut server) = duplex(64);
        let mut connection = Connection::new(client, "test");

        server.write_all(b"abc").await.unwrap();
        drop(server);

        let result = connection.read_exact(8).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionClosed {
                expected: 8,
                received: 3
            })
        ));
    }

    #[tokio::test]
    async fn read_pdu_roundtrip() {
        let (client, server) = duplex(256);
        let mut client = Connection::new(client, "client");
        let mut server = Connection::new(server, "server");

        client.write_pdu(&EnquireLink::new(2)).await.unwrap();
        let pdu = server.read_pdu().await.unwrap().unwrap();

        assert_eq!(pdu.command_id(), CommandId::EnquireLink);
        assert_eq!(pdu.sequence_number(), 2);
        assert!(pdu.body.is_empty());
    }

    #[tokio::test]
    async fn read_pdu_clean_close_is_none() {
        let (client, server) = duplex(64);
        let mut connection = Connection::new(client, "test");
        drop(server);

        assert!(connection.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_pdu_close_mid_header() {
        let (client, mut server) = duplex(64);
        let mut connection = Connection::new(client, "test");

        server.write_all(&[0x00, 0x00, 0x00, 0x10, 0x80]).await.unwrap();
        drop(server);

        let result = connection.read_pdu().await;
        assert!(matches!(
            result,
            Err(ReadError::Transport(TransportError::ConnectionClosed {
                expected: 16,
                received: 5
            }))
        ));
    }

    #[tokio::test]
    async fn read_pdu_close_mid_body() {
        let (client, mut server) = duplex(64);
        let mut connection = Connection::new(client, "test");

        let header =
            crate::codec::encode_header(CommandId::BindTransceiverResp, CommandStatus::Ok, 1, 8);
        server.write_all(&header).await.unwrap();
        server.write_all(b"SMS").await.unwrap();
        drop(server);

        let result = connection.read_pdu().await;
        assert!(matches!(
            result,
            Err(ReadError::Transport(TransportError::ConnectionClosed {
                expected: 8,
                received: 3
            }))
        ));
    }

    #[tokio::test]
    async fn read_pdu_rejects_bad_length_without_reading_body() {
        for length in [0u32, 15, 65536] {
            let (client, mut server) = duplex(256);
            let mut connection = Connection::new(client, "test");

            let mut data = length.to_be_bytes().to_vec();
            data.extend_from_slice(&[0x80, 0x00, 0x00, 0x09, 0, 0, 0, 0, 0, 0, 0, 1]);
            // A following valid PDU must still be readable: nothing beyond the
            // bad header was consumed
            data.extend_from_slice(&EnquireLink::new(9).to_bytes());
            server.write_all(&data).await.unwrap();

            let result = connection.read_pdu().await;
            assert!(
                matches!(
                    result,
                    Err(ReadError::Codec(CodecError::InvalidPduLength { length: l, .. })) if l == length
                ),
                "length {length}"
            );

            let next = connection.read_pdu().await.unwrap().unwrap();
            assert_eq!(next.sequence_number(), 9);
        }
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (client, _server) = duplex(64);
        let mut connection = Connection::new(client, "test");

        connection.close().await;
        assert!(!connection.is_open());
        connection.close().await;
        assert!(!connection.is_open());

        assert!(matches!(
            connection.write_all(b"x").await,
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            connection.read_exact(1).await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn tcp_connector_reaches_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let accept = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut server = Connection::new(socket, "esme");
            server.read_pdu().await.unwrap().unwrap()
        });

        let connector = TcpConnector::new("127.0.0.1", port);
        assert_eq!(connector.peer(), format!("127.0.0.1:{port}"));

        let mut connection = Connection::connect(&connector, Duration::from_secs(5))
            .await
            .unwrap();
        connection.write_pdu(&EnquireLink::new(4)).await.unwrap();

        let received = accept.await.unwrap();
        assert_eq!(received.command_id(), CommandId::EnquireLink);
        assert_eq!(received.sequence_number(), 4);
        connection.close().await;
    }

    #[tokio::test]
    async fn tcp_connector_refused() {
        // Grab a free port, then release it so nothing is listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = TcpConnector::new("127.0.0.1", port);
        let result = Connection::connect(&connector, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
    }
}
