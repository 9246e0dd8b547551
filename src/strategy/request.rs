//! Application-layer probe request.
//!
//! After a handshake the connection is exercised with `GET /` so that a
//! middlebox which lets the handshake through but kills the first application
//! bytes is also detected. HTTP/2 is used when `h2` was negotiated, HTTP/1.1
//! when `http/1.1` or nothing was.

use std::fmt::Display;

use http::{Method, Request, StatusCode};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::{ALPN_H2, ALPN_HTTP11, MAX_RESPONSE_HEAD_SIZE};
use crate::error_handling::ProbeError;

fn request_error<E: Display>(e: E) -> ProbeError {
    ProbeError::request(e.to_string())
}

/// Sends `GET https://<server_name>/` over `stream` and returns the response status.
///
/// Only the response head is read; the body is never consumed.
///
/// # Errors
///
/// Returns an `ErrorKind::Request` error on I/O or protocol failure, or when
/// the negotiated protocol is neither `h2` nor `http/1.1`.
pub async fn send_probe_request<S>(
    stream: S,
    server_name: &str,
    protocol: Option<&str>,
) -> Result<StatusCode, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    match protocol {
        Some(ALPN_H2) => get_h2(stream, server_name).await,
        None | Some("") | Some(ALPN_HTTP11) => get_http11(stream, server_name).await,
        Some(other) => Err(ProbeError::request(format!("unsupported ALPN: {other}"))),
    }
}

async fn get_h2<S>(stream: S, server_name: &str) -> Result<StatusCode, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let (client, connection) = h2::client::handshake(stream)
        .await
        .map_err(request_error)?;

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("https://{server_name}/"))
        .body(())
        .map_err(request_error)?;

    let exchange = async move {
        let mut client = client.ready().await?;
        let (response, _) = client.send_request(request, true)?;
        let response = response.await?;
        Ok::<_, h2::Error>(response.status())
    };
    tokio::pin!(exchange);

    // The connection future does the actual socket I/O and has to be polled
    // alongside the request.
    tokio::select! {
        biased;
        status = &mut exchange => status.map_err(request_error),
        closed = connection => match closed {
            Err(e) => Err(request_error(e)),
            Ok(()) => Err(ProbeError::request(
                "connection closed before response headers",
            )),
        },
    }
}

async fn get_http11<S>(mut stream: S, server_name: &str) -> Result<StatusCode, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let head = format!(
        "GET / HTTP/1.1\r\nHost: {server_name}\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    );
    stream
        .write_all(head.as_bytes())
        .await
        .map_err(request_error)?;
    stream.flush().await.map_err(request_error)?;

    let mut reader = BufReader::new(stream).take(MAX_RESPONSE_HEAD_SIZE as u64);

    // Header bytes are kept raw: obs-text (non-UTF-8) is legal in field values.
    let mut status_line = Vec::new();
    read_head_line(&mut reader, &mut status_line).await?;
    let status = parse_status_line(&status_line)?;

    let mut header = Vec::new();
    loop {
        header.clear();
        read_head_line(&mut reader, &mut header).await?;
        if header == b"\r\n" || header == b"\n" {
            return Ok(status);
        }
    }
}

async fn read_head_line<R>(
    reader: &mut tokio::io::Take<R>,
    line: &mut Vec<u8>,
) -> Result<(), ProbeError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let read = reader
        .read_until(b'\n', line)
        .await
        .map_err(request_error)?;
    if reader.limit() == 0 && !line.ends_with(b"\n") {
        return Err(ProbeError::request(format!(
            "response head exceeds {MAX_RESPONSE_HEAD_SIZE} bytes"
        )));
    }
    if read == 0 || !line.ends_with(b"\n") {
        return Err(ProbeError::request("unexpected EOF"));
    }
    Ok(())
}

fn parse_status_line(line: &[u8]) -> Result<StatusCode, ProbeError> {
    let line = line
        .strip_suffix(b"\n")
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .unwrap_or(line);
    let malformed = || {
        ProbeError::request(format!(
            "malformed HTTP response {:?}",
            String::from_utf8_lossy(line)
        ))
    };

    let mut parts = line.splitn(3, |&b| b == b' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with(b"HTTP/1.") {
        return Err(malformed());
    }
    let code = parts.next().ok_or_else(malformed)?;
    StatusCode::from_bytes(code).map_err(|_| malformed())
}
