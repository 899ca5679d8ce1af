//! Line framing over any async byte stream.

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::{TextEncoding, TransportError};

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Splits a stream into its two framed halves.
///
/// Called exactly once per connection; the reader goes to the receive
/// loop, the writer goes behind the connection's write lock.
pub fn split_lines<S>(
    stream: S,
    encoding: TextEncoding,
    detect_bom: bool,
) -> (LineReader, LineWriter)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let reader = LineReader {
        inner: BufReader::new(Box::new(read_half) as BoxedRead),
        encoding,
        strip_bom: detect_bom,
    };
    let writer = LineWriter {
        inner: Box::new(write_half),
        encoding,
    };
    (reader, writer)
}

/// The receiving half: yields one decoded line at a time.
pub struct LineReader {
    inner: BufReader<BoxedRead>,
    encoding: TextEncoding,
    strip_bom: bool,
}

impl LineReader {
    /// Reads the next line, without its terminator.
    ///
    /// Accepts both LF and CRLF. Returns `Ok(None)` on clean EOF. A byte
    /// sequence invalid for the configured encoding is an unrecoverable
    /// decode fault ([`TransportError::Encoding`]).
    pub async fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut line = String::new();
        let read = self.inner.read_line(&mut line).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                TransportError::Encoding("stream is not valid UTF-8".to_string())
            } else {
                TransportError::Read(e)
            }
        })?;
        if read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        // BOM detection applies to the first line only.
        if self.strip_bom {
            self.strip_bom = false;
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }

        if self.encoding == TextEncoding::Ascii && !line.is_ascii() {
            return Err(TransportError::Encoding(
                "received non-ASCII data in ASCII mode".to_string(),
            ));
        }

        Ok(Some(line))
    }
}

/// The sending half: writes one line per call.
///
/// One `send_line` call is one atomic line on the wire; mutual exclusion
/// across callers is the owner's job (the engine keeps the writer behind
/// a single lock).
pub struct LineWriter {
    inner: BoxedWrite,
    encoding: TextEncoding,
}

impl LineWriter {
    /// Writes `line` followed by CRLF and flushes.
    pub async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        if self.encoding == TextEncoding::Ascii && !line.is_ascii() {
            return Err(TransportError::Encoding(
                "refusing to send non-ASCII data in ASCII mode".to_string(),
            ));
        }
        self.inner
            .write_all(line.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        self.inner
            .write_all(b"\r\n")
            .await
            .map_err(TransportError::Write)?;
        self.inner.flush().await.map_err(TransportError::Write)
    }

    /// Half-closes the stream; the peer's reader sees EOF.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.inner.shutdown().await.map_err(TransportError::Write)
    }
}
