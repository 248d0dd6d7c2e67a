// transport/mod.rs
//! One-shot telnet transport for IrUsb relays.
//!
//! Every command opens its own TCP connection, writes `<COMMAND>\r`, drains
//! whatever the relay prints back for a short window and closes again. The
//! reply is never inspected.

use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace};

pub const DEFAULT_PORT: u16 = 9093;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Where a relay listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[async_trait]
pub trait CommandSender: Send + Sync {
    async fn send(&self, endpoint: &Endpoint, command: &str) -> Result<(), TransportError>;
}

/// ASCII bytes of `command` followed by a single carriage return.
pub fn encode_command(command: &str) -> Result<Vec<u8>, TransportError> {
    if !command.is_ascii() {
        return Err(TransportError::NonAscii(command.to_string()));
    }
    let mut frame = Vec::with_capacity(command.len() + 1);
    frame.extend_from_slice(command.as_bytes());
    frame.push(b'\r');
    Ok(frame)
}

#[derive(Debug, Clone)]
pub struct TelnetSender {
    connect_timeout: Duration,
    drain_timeout: Duration,
}

impl Default for TelnetSender {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_DRAIN_TIMEOUT)
    }
}

impl TelnetSender {
    pub fn new(connect_timeout: Duration, drain_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            drain_timeout,
        }
    }

    async fn exchange(
        &self,
        stream: &mut TcpStream,
        addr: &str,
        frame: &[u8],
    ) -> Result<(), TransportError> {
        timeout(self.connect_timeout, stream.write_all(frame))
            .await
            .map_err(|_| TransportError::Timeout {
                addr: addr.to_string(),
                stage: "writing to",
                timeout: self.connect_timeout,
            })?
            .map_err(|source| TransportError::Write {
                addr: addr.to_string(),
                source,
            })?;

        // Skip the response: take whatever arrives before the deadline.
        let deadline = Instant::now() + self.drain_timeout;
        let mut buf = [0u8; 256];
        loop {
            match timeout_at(deadline, stream.read(&mut buf)).await {
                Err(_) | Ok(Ok(0)) => break,
                Ok(Ok(n)) => trace!(%addr, bytes = n, "Discarding reply"),
                Ok(Err(source)) => {
                    return Err(TransportError::Disconnected {
                        addr: addr.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommandSender for TelnetSender {
    async fn send(&self, endpoint: &Endpoint, command: &str) -> Result<(), TransportError> {
        let frame = encode_command(command)?;
        let addr = endpoint.to_string();

        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        let mut stream = timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| TransportError::Timeout {
                addr: addr.clone(),
                stage: "connecting to",
                timeout: self.connect_timeout,
            })?
            .map_err(|source| TransportError::Connect {
                addr: addr.clone(),
                source,
            })?;

        debug!(%addr, "Sending: {}", command);
        let result = self.exchange(&mut stream, &addr, &frame).await;

        if let Err(e) = stream.shutdown().await {
            trace!(%addr, error = %e, "Shutdown after send failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDevice;

    fn fast_sender() -> TelnetSender {
        TelnetSender::new(Duration::from_millis(500), Duration::from_millis(50))
    }

    #[test]
    fn endpoint_display_brackets_ipv6() {
        assert_eq!(Endpoint::new("10.0.0.5", 9093).to_string(), "10.0.0.5:9093");
        assert_eq!(Endpoint::new("::1", 9093).to_string(), "[::1]:9093");
    }

    #[test]
    fn encode_appends_single_carriage_return() {
        assert_eq!(encode_command("QWAKE").unwrap(), b"QWAKE\r".to_vec());
        assert_eq!(encode_command("").unwrap(), b"\r".to_vec());
    }

    #[test]
    fn encode_rejects_non_ascii() {
        assert!(matches!(
            encode_command("QWAKÉ"),
            Err(TransportError::NonAscii(cmd)) if cmd == "QWAKÉ"
        ));
    }

    #[tokio::test]
    async fn sends_command_and_closes() {
        let device = MockDevice::start(b"").await;
        fast_sender()
            .send(&device.endpoint(), "QHIDCODE1000082")
            .await
            .unwrap();

        let sessions = device.sessions(1).await;
        assert_eq!(sessions, vec![b"QHIDCODE1000082\r".to_vec()]);
    }

    #[tokio::test]
    async fn reply_is_discarded() {
        let device = MockDevice::start(b"OK\r\nIrUsb> ").await;
        fast_sender().send(&device.endpoint(), "OFF").await.unwrap();
        assert_eq!(device.sessions(1).await, vec![b"OFF\r".to_vec()]);
    }

    #[tokio::test]
    async fn each_send_opens_a_new_connection() {
        let device = MockDevice::start(b"").await;
        let sender = fast_sender();
        sender.send(&device.endpoint(), "QWAKE").await.unwrap();
        sender.send(&device.endpoint(), "OFF").await.unwrap();
        assert_eq!(
            device.sessions(2).await,
            vec![b"QWAKE\r".to_vec(), b"OFF\r".to_vec()]
        );
    }

    #[tokio::test]
    async fn non_ascii_is_rejected_before_connecting() {
        let device = MockDevice::start(b"").await;
        let err = fast_sender()
            .send(&device.endpoint(), "höme")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NonAscii(_)));
        assert_eq!(device.accepted(), 0);
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = fast_sender()
            .send(&Endpoint::new("127.0.0.1", port), "QWAKE")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }), "{err}");
    }

    #[tokio::test]
    async fn unreachable_host_is_bounded_by_connect_timeout() {
        let sender = TelnetSender::new(Duration::from_millis(300), Duration::from_millis(50));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            sender.send(&Endpoint::new("10.255.255.1", DEFAULT_PORT), "QWAKE"),
        )
        .await
        .expect("send must not outlive its connect timeout");
        assert!(result.is_err());
    }
}
