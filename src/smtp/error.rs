use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Step of the probe dialogue, used to label timeouts and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Connect,
    TlsHandshake,
    Greeting,
    Ehlo,
    Helo,
    StartTls,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::TlsHandshake => "TLS handshake",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::StartTls => "STARTTLS",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        })
    }
}

/// Connection-level failures of a probe.
///
/// Explicit SMTP rejections are not errors; they come back as replies.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("{stage} timed out after {duration:?}")]
    Timeout {
        stage: ProbeStage,
        duration: Duration,
    },
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid TLS server name '{0}'")]
    InvalidServerName(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed reply: {0}")]
    MalformedReply(String),
    #[error("reply line exceeds {0} bytes")]
    ReplyTooLong(usize),
    #[error("connection closed by server")]
    ConnectionClosed,
    #[error("recipient '{0}' cannot be sent in RCPT TO")]
    UnsafeRecipient(String),
}

impl ProbeError {
    pub(crate) fn timeout(stage: ProbeStage, duration: Duration) -> Self {
        Self::Timeout { stage, duration }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
