//! TLS probe strategies.
//!
//! A strategy is one TLS client stack: given a freshly dialed TCP connection
//! and a server name, it performs a handshake and reports the negotiated ALPN
//! protocol. Strategies live in a [`StrategyRegistry`] whose order is fixed for
//! the run and defines both the failure bit of each strategy and its output
//! column.
//!
//! Built-in strategies are rustls stacks shaped to different client hello
//! fingerprints (see [`FingerprintProfile`]).

mod registry;
mod request;
mod tls;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error_handling::ProbeError;

pub use registry::{default_registry, StrategyRegistry};
pub use request::send_probe_request;
pub use tls::{webpki_root_store, FingerprintProfile, RustlsStrategy};

/// Any secured byte stream a strategy hands back after its handshake.
pub trait SecureStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> SecureStream for T {}

/// A completed handshake: the secured stream plus the negotiated ALPN protocol
/// (`None` when the server selected none).
pub struct Handshake {
    pub stream: Box<dyn SecureStream>,
    pub protocol: Option<String>,
}

/// One pluggable TLS client stack.
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// Stable identifier; the output column is `err_<name>`.
    fn name(&self) -> &str;

    /// Handshakes `conn` for `server_name`.
    ///
    /// Failures are reported as `ErrorKind::Handshake` with the provider's
    /// message untouched.
    async fn handshake(&self, conn: TcpStream, server_name: &str)
        -> Result<Handshake, ProbeError>;

    /// Confirms the secured connection is usable by issuing `GET /` over the
    /// negotiated protocol.
    async fn issue_probe_request(
        &self,
        session: Handshake,
        server_name: &str,
    ) -> Result<(), ProbeError> {
        send_probe_request(session.stream, server_name, session.protocol.as_deref())
            .await
            .map(|_| ())
    }
}
