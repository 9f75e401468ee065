//! Client transports.
//!
//! A session reads and writes whole records through [`RecordTransport`].
//! [`Transport`] is the socket-backed implementation (plain TCP or
//! client-side TLS, both framed with [`LineCodec`]); any other
//! `AsyncRead + AsyncWrite` stream can be framed directly with
//! [`framed`], which is how tests drive sessions over in-memory pipes.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::LineCodec;
use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, ProtocolError};

/// Keepalive probe idle time.
pub const KEEPALIVE_TIME: Duration = Duration::from_secs(120);
/// Keepalive probe interval.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Reads and writes complete records.
///
/// `read_record` must be cancel safe: a session polls it inside
/// `tokio::select!` and may drop the future before it completes.
#[async_trait]
pub trait RecordTransport: Send {
    /// Next complete record, or `None` once the peer has closed.
    async fn read_record(&mut self) -> Result<Option<String>, ProtocolError>;

    /// Write one record; the terminator is appended by the codec.
    async fn write_record(&mut self, line: String) -> Result<(), ProtocolError>;
}

#[async_trait]
impl<S> RecordTransport for Framed<S, LineCodec>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_record(&mut self) -> Result<Option<String>, ProtocolError> {
        self.next().await.transpose()
    }

    async fn write_record(&mut self, line: String) -> Result<(), ProtocolError> {
        self.send(line).await
    }
}

/// Frame an arbitrary byte stream with a [`LineCodec`].
pub fn framed<S>(stream: S, max_line_len: usize) -> Framed<S, LineCodec>
where
    S: AsyncRead + AsyncWrite,
{
    Framed::new(stream, LineCodec::with_max_line_len(max_line_len))
}

/// A connected socket, plain or TLS.
#[allow(clippy::large_enum_variant)]
pub enum Transport {
    /// Plaintext TCP.
    Tcp {
        /// Framed socket.
        framed: Framed<TcpStream, LineCodec>,
    },
    /// TLS over TCP.
    Tls {
        /// Framed TLS stream.
        framed: Framed<TlsStream<TcpStream>, LineCodec>,
    },
}

impl Transport {
    /// Open the socket described by `config`.
    ///
    /// `tls` must be supplied when `config.tls` is set.
    pub async fn connect(
        config: &ConnectionConfig,
        tls: Option<Arc<ClientConfig>>,
    ) -> Result<Self, ConnectionError> {
        debug!(server = %config.name, host = %config.host, port = config.port, tls = config.tls, "connecting");
        let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
        if config.keepalive {
            if let Err(e) = Self::enable_keepalive(&stream) {
                warn!(server = %config.name, "failed to enable TCP keepalive: {}", e);
            }
        }

        if !config.tls {
            return Ok(Self::tcp(stream, config.max_line_len));
        }

        let tls = tls.ok_or_else(|| ConnectionError::MissingTlsConfig(config.name.clone()))?;
        let server_name = ServerName::try_from(config.host.clone())
            .map_err(|_| ConnectionError::InvalidServerName(config.host.clone()))?;
        let stream = TlsConnector::from(tls).connect(server_name, stream).await?;
        Ok(Self::tls(stream, config.max_line_len))
    }

    /// Wrap a connected TCP stream.
    pub fn tcp(stream: TcpStream, max_line_len: usize) -> Self {
        Self::Tcp {
            framed: framed(stream, max_line_len),
        }
    }

    /// Wrap an established TLS stream.
    pub fn tls(stream: TlsStream<TcpStream>, max_line_len: usize) -> Self {
        Self::Tls {
            framed: framed(stream, max_line_len),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(KEEPALIVE_TIME)
            .with_interval(KEEPALIVE_INTERVAL);

        sock.set_tcp_keepalive(&keepalive)
    }

    /// Whether the socket is TLS-wrapped.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }
}

#[async_trait]
impl RecordTransport for Transport {
    async fn read_record(&mut self) -> Result<Option<String>, ProtocolError> {
        match self {
            Transport::Tcp { framed } => framed.read_record().await,
            Transport::Tls { framed } => framed.read_record().await,
        }
    }

    async fn write_record(&mut self, line: String) -> Result<(), ProtocolError> {
        match self {
            Transport::Tcp { framed } => framed.write_record(line).await,
            Transport::Tls { framed } => framed.write_record(line).await,
        }
    }
}
