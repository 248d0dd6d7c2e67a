// testing.rs
//! Fakes shared by the unit tests.

use crate::error::TransportError;
use crate::transport::{CommandSender, Endpoint};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// A relay stand-in that records the bytes of every connection it serves.
pub struct MockDevice {
    addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    sessions: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl MockDevice {
    /// Serves connections one at a time, greeting each with `reply`.
    pub async fn start(reply: &'static [u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();

        let counter = Arc::clone(&accepted);
        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = stream.write_all(reply).await;
                let mut received = Vec::new();
                let _ = stream.read_to_end(&mut received).await;
                if tx.send(received).is_err() {
                    break;
                }
            }
        });

        Self {
            addr,
            accepted,
            sessions: Mutex::new(rx),
            task,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.addr.ip().to_string(), self.addr.port())
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Waits for `count` finished connections and returns what each carried.
    pub async fn sessions(&self, count: usize) -> Vec<Vec<u8>> {
        let mut rx = self.sessions.lock().await;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let session = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("mock device saw no connection")
                .expect("mock device stopped");
            out.push(session);
        }
        out
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sender that records commands instead of touching the network.
#[derive(Default)]
pub struct RecordingSender {
    fail: bool,
    sent: std::sync::Mutex<Vec<(Endpoint, String)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, command)| command.clone())
            .collect()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }
}

#[async_trait]
impl CommandSender for RecordingSender {
    async fn send(&self, endpoint: &Endpoint, command: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.clone(), command.to_string()));
        if self.fail {
            return Err(TransportError::Connect {
                addr: endpoint.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            });
        }
        Ok(())
    }
}
