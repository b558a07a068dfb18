// ABOUTME: In-memory connectors and a scripted SMSC peer for session tests
// ABOUTME: Lets tests drive both ends of a session without touching the network

use crate::codec::{Decodable, Encodable, Pdu};
use crate::connection::{Connection, Connector};
use std::collections::VecDeque;
use std::future;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{DuplexStream, duplex};

const PIPE_CAPACITY: usize = 4096;

/// Hands out pre-made in-memory streams, one per connect call.
pub struct DuplexConnector {
    streams: Mutex<VecDeque<DuplexStream>>,
}

impl DuplexConnector {
    /// A connector good for one connect, plus the SMSC end of its stream
    pub fn pair() -> (Self, DuplexStream) {
        let (client, server) = duplex(PIPE_CAPACITY);
        let connector = DuplexConnector {
            streams: Mutex::new(VecDeque::from([client])),
        };
        (connector, server)
    }

    /// A connector good for two connects
    pub fn two() -> (Self, DuplexStream, DuplexStream) {
        let (client_a, server_a) = duplex(PIPE_CAPACITY);
        let (client_b, server_b) = duplex(PIPE_CAPACITY);
        let connector = DuplexConnector {
            streams: Mutex::new(VecDeque::from([client_a, client_b])),
        };
        (connector, server_a, server_b)
    }
}

impl Connector for DuplexConnector {
    type Stream = DuplexStream;

    fn peer(&self) -> String {
        "duplex".to_string()
    }

    async fn connect(&self) -> io::Result<DuplexStream> {
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))
    }
}

/// A connect that never completes, like a SYN to a black-holed address.
#[derive(Default)]
pub struct PendingConnector {
    attempts: AtomicUsize,
}

impl PendingConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for PendingConnector {
    type Stream = DuplexStream;

    fn peer(&self) -> String {
        "pending".to_string()
    }

    async fn connect(&self) -> io::Result<DuplexStream> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        future::pending().await
    }
}

/// Every connect is refused.
pub struct RefusingConnector;

impl Connector for RefusingConnector {
    type Stream = DuplexStream;

    fn peer(&self) -> String {
        "refusing".to_string()
    }

    async fn connect(&self) -> io::Result<DuplexStream> {
        Err(io::Error::from(io::ErrorKind::ConnectionRefused))
    }
}

/// The SMSC side of an in-memory session.
pub struct MockSmsc {
    connection: Connection<DuplexStream>,
}

impl MockSmsc {
    pub fn new(stream: DuplexStream) -> Self {
        MockSmsc {
            connection: Connection::new(stream, "esme"),
        }
    }

    /// Next PDU from the session, or `None` once it has closed
    pub async fn next_pdu(&mut self) -> Option<Pdu> {
        self.connection.read_pdu().await.unwrap()
    }

    /// Read the next PDU and decode it as `T`, panicking on anything else
    pub async fn expect_pdu<T: Decodable>(&mut self) -> T {
        let pdu = self
            .next_pdu()
            .await
            .expect("session closed before sending a PDU");
        pdu.parse().unwrap()
    }

    pub async fn reply<P: Encodable>(&mut self, pdu: &P) {
        self.connection.write_pdu(pdu).await.unwrap();
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.connection.write_all(bytes).await.unwrap();
    }
}
