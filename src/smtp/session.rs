use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::error::{ProbeError, ProbeStage};
use super::reply::{SmtpReply, parse_reply_line};
use super::tls::server_name;

/// Upper bound on a single reply line (RFC 5321 allows 512 octets).
const MAX_LINE_LEN: usize = 4096;

pub trait AsyncReadAndWrite: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncReadAndWrite for T {}

pub type BoxedStream = Box<dyn AsyncReadAndWrite>;

/// One SMTP conversation with a single host.
///
/// Every read and write is bounded by the session timeout. The transport is
/// boxed so it can be swapped for its TLS-wrapped form mid-session.
pub struct SmtpSession {
    host: String,
    stream: Option<BoxedStream>,
    read_buffer: Vec<u8>,
    timeout: Duration,
    secure: bool,
}

impl SmtpSession {
    /// Opens a plaintext TCP connection to `host:port`.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ProbeError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ProbeError::timeout(ProbeStage::Connect, timeout))?
            .map_err(|source| ProbeError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;
        // best effort; the conversation works either way
        let _ = stream.set_nodelay(true);

        tracing::trace!(target: "smtp_probe", host, port, "connected");
        Ok(Self::with_stream(stream, host, timeout))
    }

    /// Wraps an already-connected transport.
    pub fn with_stream<S>(stream: S, host: &str, timeout: Duration) -> Self
    where
        S: AsyncReadAndWrite + 'static,
    {
        Self {
            host: host.to_string(),
            stream: Some(Box::new(stream)),
            read_buffer: Vec::with_capacity(1024),
            timeout,
            secure: false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the transport is currently TLS-protected.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Performs a TLS handshake over the current transport and continues on
    /// the encrypted stream.
    pub async fn upgrade_tls(&mut self, connector: &TlsConnector) -> Result<(), ProbeError> {
        let name = server_name(&self.host)?;
        let stream = self.stream.take().ok_or(ProbeError::ConnectionClosed)?;
        // anything buffered before the handshake was sent in the clear
        self.read_buffer.clear();

        let tls = tokio::time::timeout(self.timeout, connector.connect(name, stream))
            .await
            .map_err(|_| ProbeError::timeout(ProbeStage::TlsHandshake, self.timeout))?
            .map_err(|source| ProbeError::Tls {
                host: self.host.clone(),
                source,
            })?;

        self.stream = Some(Box::new(tls));
        self.secure = true;
        tracing::trace!(target: "smtp_probe", host = %self.host, "TLS established");
        Ok(())
    }

    /// Sends one command line and reads its reply.
    pub async fn command(&mut self, line: &str, stage: ProbeStage) -> Result<SmtpReply, ProbeError> {
        self.write_line(line, stage).await?;
        self.read_reply(stage).await
    }

    /// Reads a complete reply, following continuation lines.
    pub async fn read_reply(&mut self, stage: ProbeStage) -> Result<SmtpReply, ProbeError> {
        let mut code = None;
        let mut lines = Vec::new();

        loop {
            let line = self.read_line(stage).await?;
            let parsed = parse_reply_line(&line)?;
            match code {
                None => code = Some(parsed.code),
                Some(expected) if expected != parsed.code => {
                    return Err(ProbeError::MalformedReply(format!(
                        "expected code {expected} in continuation, got '{line}'"
                    )));
                }
                Some(_) => {}
            }
            lines.push(parsed.content.to_string());
            if parsed.is_final {
                break;
            }
        }

        let reply = SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        };
        tracing::trace!(target: "smtp_probe", host = %self.host, %stage, reply = %reply, "<-");
        Ok(reply)
    }

    /// Sends QUIT and closes the transport, ignoring every failure.
    pub async fn quit(&mut self) {
        if self.stream.is_none() {
            return;
        }
        if let Err(err) = self.command("QUIT", ProbeStage::Quit).await {
            tracing::trace!(target: "smtp_probe", host = %self.host, error = %err, "QUIT failed");
        }
        if let Some(mut stream) = self.stream.take() {
            let _ = tokio::time::timeout(self.timeout, stream.shutdown()).await;
        }
    }

    async fn write_line(&mut self, line: &str, stage: ProbeStage) -> Result<(), ProbeError> {
        tracing::trace!(target: "smtp_probe", host = %self.host, %stage, line, "->");
        let stream = self.stream.as_mut().ok_or(ProbeError::ConnectionClosed)?;
        let data = format!("{line}\r\n");

        tokio::time::timeout(self.timeout, async {
            stream.write_all(data.as_bytes()).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| ProbeError::timeout(stage, self.timeout))??;
        Ok(())
    }

    async fn read_line(&mut self, stage: ProbeStage) -> Result<String, ProbeError> {
        loop {
            if let Some(pos) = self.read_buffer.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.read_buffer.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if self.read_buffer.len() > MAX_LINE_LEN {
                return Err(ProbeError::ReplyTooLong(MAX_LINE_LEN));
            }

            let stream = self.stream.as_mut().ok_or(ProbeError::ConnectionClosed)?;
            let mut chunk = [0u8; 1024];
            let n = tokio::time::timeout(self.timeout, stream.read(&mut chunk))
                .await
                .map_err(|_| ProbeError::timeout(stage, self.timeout))??;
            if n == 0 {
                self.stream = None;
                return Err(ProbeError::ConnectionClosed);
            }
            self.read_buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_reads_multiline_reply() {
        let mock = Builder::new()
            .read(b"250-mx.example.com Hello\r\n250-PIPE")
            .read(b"LINING\r\n250 STARTTLS\r\n")
            .build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        let reply = session.read_reply(ProbeStage::Ehlo).await.unwrap();
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines, ["mx.example.com Hello", "PIPELINING", "STARTTLS"]);
        assert!(reply.has_capability("STARTTLS"));
    }

    #[tokio::test]
    async fn test_command_writes_crlf_terminated_line() {
        let mock = Builder::new()
            .write(b"MAIL FROM:<verify@probe.test>\r\n")
            .read(b"250 2.1.0 Ok\r\n")
            .build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        let reply = session
            .command("MAIL FROM:<verify@probe.test>", ProbeStage::MailFrom)
            .await
            .unwrap();
        assert_eq!(reply.to_string(), "250 2.1.0 Ok");
    }

    #[tokio::test]
    async fn test_accepts_bare_newlines() {
        let mock = Builder::new().read(b"220 ready\n").build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        let reply = session.read_reply(ProbeStage::Greeting).await.unwrap();
        assert_eq!(reply.code, 220);
    }

    #[tokio::test]
    async fn test_mismatched_continuation_code_is_malformed() {
        let mock = Builder::new().read(b"250-first\r\n550 second\r\n").build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        let err = session.read_reply(ProbeStage::Ehlo).await.unwrap_err();
        assert!(matches!(err, ProbeError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn test_eof_is_connection_closed() {
        let mock = Builder::new().read(b"220-partial\r\n").build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        let err = session.read_reply(ProbeStage::Greeting).await.unwrap_err();
        assert!(matches!(err, ProbeError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let mock = Builder::new().wait(Duration::from_millis(500)).build();
        let mut session =
            SmtpSession::with_stream(mock, "mx.example.com", Duration::from_millis(30));

        let err = session.read_reply(ProbeStage::Greeting).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().starts_with("greeting timed out"));
    }

    #[tokio::test]
    async fn test_upgrade_discards_plaintext_leftovers() {
        use crate::smtp::tls::build_tls_connector;
        use std::io;

        let mock = Builder::new()
            .read(b"220 2.0.0 Ready\r\n250 injected\r\n")
            .write_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut session = SmtpSession::with_stream(mock, "127.0.0.1", TIMEOUT);

        let reply = session.read_reply(ProbeStage::StartTls).await.unwrap();
        assert_eq!(reply.code, 220);
        assert!(!session.read_buffer.is_empty());

        let err = session
            .upgrade_tls(&build_tls_connector(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Tls { .. }));
        assert!(session.read_buffer.is_empty());
        assert!(!session.is_secure());
    }

    #[tokio::test]
    async fn test_quit_after_close_is_noop() {
        let mock = Builder::new().build();
        let mut session = SmtpSession::with_stream(mock, "mx.example.com", TIMEOUT);

        assert!(session.read_reply(ProbeStage::Greeting).await.is_err());
        session.quit().await;
    }
}
