//! rustls-backed strategies.
//!
//! Each [`FingerprintProfile`] changes what the client hello looks like on the
//! wire (cipher-suite order, offered key-exchange groups, session ticket
//! extension) while keeping the same certificate verification. A middlebox that
//! discriminates on the hello fingerprint will then fail some profiles but not
//! others against the same host.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rustls::client::Resumption;
use rustls::crypto::ring::{cipher_suite, default_provider, kx_group};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::config::{ALPN_H2, ALPN_HTTP11};
use crate::error_handling::{InitializationError, ProbeError};

use super::{Handshake, ProbeStrategy};

/// Client hello shapes available to [`RustlsStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintProfile {
    /// Stock rustls: its own suite order, groups and resumption.
    Standard,
    /// Chrome's suite order. The stock groups (X25519, P-256, P-384) already
    /// match what Chrome offers.
    ChromeLike,
    /// Chrome's suite order with only X25519 and P-256, without session tickets.
    Light,
}

/// Chrome's preference order, restricted to the suites rustls implements.
fn chrome_cipher_suites() -> Vec<rustls::SupportedCipherSuite> {
    vec![
        cipher_suite::TLS13_AES_128_GCM_SHA256,
        cipher_suite::TLS13_AES_256_GCM_SHA384,
        cipher_suite::TLS13_CHACHA20_POLY1305_SHA256,
        cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
        cipher_suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        cipher_suite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
        cipher_suite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    ]
}

impl FingerprintProfile {
    pub fn crypto_provider(&self) -> CryptoProvider {
        match self {
            FingerprintProfile::Standard => default_provider(),
            FingerprintProfile::ChromeLike => CryptoProvider {
                cipher_suites: chrome_cipher_suites(),
                ..default_provider()
            },
            FingerprintProfile::Light => CryptoProvider {
                cipher_suites: chrome_cipher_suites(),
                kx_groups: vec![kx_group::X25519, kx_group::SECP256R1],
                ..default_provider()
            },
        }
    }

    fn resumption(&self) -> Resumption {
        match self {
            FingerprintProfile::Light => Resumption::disabled(),
            _ => Resumption::default(),
        }
    }

    /// Builds the client configuration for this profile.
    ///
    /// Every profile offers ALPN `h2, http/1.1` and sends SNI.
    pub fn client_config(&self, roots: RootCertStore) -> Result<ClientConfig, rustls::Error> {
        let mut config = ClientConfig::builder_with_provider(Arc::new(self.crypto_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();
        config.alpn_protocols = vec![ALPN_H2.as_bytes().to_vec(), ALPN_HTTP11.as_bytes().to_vec()];
        config.resumption = self.resumption();
        Ok(config)
    }
}

/// Mozilla's root set, as shipped by `webpki-roots`.
pub fn webpki_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    root_store
}

/// A named strategy running rustls with one fingerprint profile.
pub struct RustlsStrategy {
    name: String,
    connector: TlsConnector,
}

impl RustlsStrategy {
    /// Builds a strategy that trusts `roots`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if rustls rejects the profile.
    pub fn new(
        name: impl Into<String>,
        profile: FingerprintProfile,
        roots: RootCertStore,
    ) -> Result<Self, InitializationError> {
        let name = name.into();
        let config = profile
            .client_config(roots)
            .map_err(|source| InitializationError::TlsConfigError {
                strategy: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            connector: TlsConnector::from(Arc::new(config)),
        })
    }

    pub fn with_webpki_roots(
        name: impl Into<String>,
        profile: FingerprintProfile,
    ) -> Result<Self, InitializationError> {
        Self::new(name, profile, webpki_root_store())
    }
}

#[async_trait]
impl ProbeStrategy for RustlsStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handshake(
        &self,
        conn: TcpStream,
        server_name: &str,
    ) -> Result<Handshake, ProbeError> {
        let domain = ServerName::try_from(server_name.to_owned())
            .map_err(|e| ProbeError::handshake(e.to_string()))?;

        let stream = self
            .connector
            .connect(domain, conn)
            .await
            .map_err(|e| ProbeError::handshake(e.to_string()))?;

        let protocol = stream
            .get_ref()
            .1
            .alpn_protocol()
            .map(|p| String::from_utf8_lossy(p).into_owned());
        debug!(
            "{}: handshake with {server_name} ok, alpn={:?}",
            self.name, protocol
        );

        Ok(Handshake {
            stream: Box::new(stream),
            protocol,
        })
    }
}
