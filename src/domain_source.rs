//! Hostname input.
//!
//! Reads a line-delimited list lazily, one hostname per line, in input order.
//! Lines are passed through untouched: blank lines and comments are probe
//! targets like any other line, and bytes that are not UTF-8 are replaced
//! rather than ending the input.

use std::path::Path;

use log::warn;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};

use crate::config::STDIN_PATH;
use crate::error_handling::InitializationError;

/// A finite, non-restartable sequence of hostnames.
pub struct DomainSource {
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    line: Vec<u8>,
}

impl DomainSource {
    /// Opens `path`, or stdin when `path` is `-`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::DomainListError` if the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, InitializationError> {
        if path.as_os_str() == STDIN_PATH {
            log::info!("Reading domains from stdin");
            return Ok(Self::from_reader(tokio::io::stdin()));
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| InitializationError::DomainListError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_reader(file))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            reader: Box::new(BufReader::new(reader)),
            line: Vec::new(),
        }
    }

    /// Next hostname, or `None` at end of input.
    ///
    /// The line terminator (`\n` or `\r\n`) is stripped and invalid UTF-8 is
    /// replaced with U+FFFD. Only an I/O error ends the sequence early; it is
    /// logged.
    pub async fn next_domain(&mut self) -> Option<String> {
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line).await {
            Ok(0) => None,
            Ok(_) => {
                let mut line = self.line.as_slice();
                if let Some(rest) = line.strip_suffix(b"\n") {
                    line = rest.strip_suffix(b"\r").unwrap_or(rest);
                }
                Some(String::from_utf8_lossy(line).into_owned())
            }
            Err(e) => {
                warn!("Stopped reading domain list: {e}");
                None
            }
        }
    }
}
