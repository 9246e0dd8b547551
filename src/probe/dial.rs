//! TCP dialing.

use std::net::SocketAddr;
use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;

use crate::error_handling::ProbeError;

/// Opens a fresh TCP connection to `addr`, giving up after `timeout`.
///
/// Both refusal and timeout are reported as the same `ErrorKind::Connect`
/// error; the underlying cause is only logged.
pub async fn dial(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ProbeError> {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => {
            debug!("Failed to connect to {addr}: {e}");
            Err(ProbeError::connect())
        }
        Err(_) => {
            debug!("Connect to {addr} timed out after {}s", timeout.as_secs_f32());
            Err(ProbeError::connect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_dial_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(dial(addr, Duration::from_secs(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_dial_refused_is_connect_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let err = dial(addr, Duration::from_secs(2)).await.unwrap_err();
        assert!(err.is(ErrorKind::Connect));
        assert_eq!(err.message(), "unable to connect");
    }
}
