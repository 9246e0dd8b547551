//! Error type definitions.
//!
//! This module defines the probe failure taxonomy and the setup errors that
//! terminate a run.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::{AsRefStr, EnumIter as EnumIterMacro};
use thiserror::Error;

use crate::config::{MSG_CONNECT, MSG_DNS_RESOLUTION, MSG_TIMEOUT};

/// Error types for setup failures.
///
/// These are the only fatal errors: they stop the run before (or while) the
/// pipeline is assembled.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building a TLS client configuration for a strategy.
    #[error("TLS configuration error for strategy '{strategy}': {source}")]
    TlsConfigError {
        /// Strategy whose configuration was rejected
        strategy: String,
        /// Underlying rustls error
        source: rustls::Error,
    },

    /// A strategy could not be appended to the registry.
    #[error("Strategy registry error: {0}")]
    RegistryError(String),

    /// The domain list could not be opened.
    #[error("Unable to open domain list {}: {source}", .path.display())]
    DomainListError {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The record file could not be created or its header written.
    #[error("Unable to create record file {}: {source}", .path.display())]
    OutputFileError {
        /// Path that failed to be created
        path: PathBuf,
        /// Underlying CSV/I/O error
        source: csv::Error,
    },
}

/// Kinds of failure a single strategy slot can carry.
///
/// `DnsResolution`, `Connect`, `Timeout` and `Internal` are fanned out to every
/// slot of a domain; `Handshake` and `Request` are local to one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Name lookup failed or returned no address.
    DnsResolution,
    /// TCP dial failed or exceeded the connect timeout.
    Connect,
    /// The TLS provider rejected the handshake.
    Handshake,
    /// The handshake succeeded but the GET over the negotiated protocol failed.
    Request,
    /// The per-domain deadline elapsed first.
    Timeout,
    /// The probe task for the domain panicked.
    Internal,
}

/// A typed probe failure: the kind plus a human-readable message.
///
/// Two errors are equal when both kind and message match; callers that care
/// only about the class compare `kind()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProbeError {
    kind: ErrorKind,
    message: String,
}

impl ProbeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn dns_resolution() -> Self {
        Self::new(ErrorKind::DnsResolution, MSG_DNS_RESOLUTION)
    }

    pub fn connect() -> Self {
        Self::new(ErrorKind::Connect, MSG_CONNECT)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, MSG_TIMEOUT)
    }

    /// Handshake failure; the provider's message is kept verbatim.
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handshake, message)
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Request, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}
