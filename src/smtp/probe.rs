use async_trait::async_trait;
use std::time::Duration;
use tokio_rustls::TlsConnector;

use super::candidate::ProbeCandidate;
use super::error::{ProbeError, ProbeStage};
use super::reply::SmtpReply;
use super::session::SmtpSession;

/// How a single probe ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDisposition {
    /// RCPT TO answered 2xx.
    Accepted,
    /// The server answered 5xx (or another non-2xx, non-4xx code) at some step.
    Rejected,
    /// The server answered 4xx at some step.
    Deferred,
    /// Connect, TLS, timeout or protocol failure, or a recipient that cannot
    /// be put on the wire; no usable SMTP reply.
    ConnectionFailure,
}

/// Result of one SMTP probe against one host and candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub accepted: bool,
    pub response_code: Option<u16>,
    pub message: String,
    pub disposition: ProbeDisposition,
    /// Whether the conversation was TLS-protected when it ended.
    pub secure: bool,
}

impl ProbeOutcome {
    pub fn from_reply(stage: ProbeStage, reply: &SmtpReply, secure: bool) -> Self {
        let disposition = if reply.is_positive_completion() {
            ProbeDisposition::Accepted
        } else if reply.is_transient_failure() {
            ProbeDisposition::Deferred
        } else {
            ProbeDisposition::Rejected
        };
        Self {
            accepted: disposition == ProbeDisposition::Accepted,
            response_code: Some(reply.code),
            message: format!("{stage} replied {reply}"),
            disposition,
            secure,
        }
    }

    pub fn connection_failure(err: &ProbeError) -> Self {
        Self {
            accepted: false,
            response_code: None,
            message: err.to_string(),
            disposition: ProbeDisposition::ConnectionFailure,
            secure: false,
        }
    }
}

/// Refuses recipients that would break out of the `RCPT TO:<...>` path or
/// smuggle extra command lines.
pub(crate) fn check_recipient(address: &str) -> Result<(), ProbeError> {
    if address.is_empty()
        || address
            .chars()
            .any(|c| c == '<' || c == '>' || c.is_control())
    {
        return Err(ProbeError::UnsafeRecipient(address.escape_debug().to_string()));
    }
    Ok(())
}

/// Asks a mail host whether it would accept mail for an address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    /// Never fails outward; every failure is folded into the outcome.
    async fn probe(&self, address: &str, host: &str, candidate: &ProbeCandidate) -> ProbeOutcome;
}

/// Probes over real TCP connections, stopping after RCPT TO.
///
/// The dialogue is: greeting, EHLO (HELO if EHLO is refused), optional
/// STARTTLS with a second EHLO, `MAIL FROM`, `RCPT TO`, then QUIT. No message
/// data is ever sent.
pub struct SmtpProber {
    helo_name: String,
    sender: String,
    timeout: Duration,
    tls: TlsConnector,
}

impl SmtpProber {
    pub fn new(helo_name: impl Into<String>, timeout: Duration, tls: TlsConnector) -> Self {
        let helo_name = helo_name.into();
        let sender = format!("verify@{helo_name}");
        Self {
            helo_name,
            sender,
            timeout,
            tls,
        }
    }

    async fn open(&self, host: &str, candidate: &ProbeCandidate) -> Result<SmtpSession, ProbeError> {
        let mut session = SmtpSession::connect(host, candidate.port, self.timeout).await?;
        if candidate.use_implicit_tls {
            session.upgrade_tls(&self.tls).await?;
        }
        Ok(session)
    }

    /// Runs the dialogue on an open session and always closes it afterwards.
    pub(crate) async fn probe_session(
        &self,
        session: &mut SmtpSession,
        address: &str,
        candidate: &ProbeCandidate,
    ) -> ProbeOutcome {
        let result = self.converse(session, address, candidate).await;
        session.quit().await;

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(
                    target: "smtp_probe",
                    host = session.host(),
                    %candidate,
                    error = %err,
                    "probe failed"
                );
                ProbeOutcome::connection_failure(&err)
            }
        }
    }

    async fn converse(
        &self,
        session: &mut SmtpSession,
        address: &str,
        candidate: &ProbeCandidate,
    ) -> Result<ProbeOutcome, ProbeError> {
        let greeting = session.read_reply(ProbeStage::Greeting).await?;
        if !greeting.is_positive_completion() {
            return Ok(ProbeOutcome::from_reply(
                ProbeStage::Greeting,
                &greeting,
                session.is_secure(),
            ));
        }

        let (stage, mut hello) = self.announce(session).await?;
        if !hello.is_positive_completion() {
            return Ok(ProbeOutcome::from_reply(stage, &hello, session.is_secure()));
        }

        if candidate.use_opportunistic_tls
            && !session.is_secure()
            && hello.has_capability("STARTTLS")
        {
            let reply = session.command("STARTTLS", ProbeStage::StartTls).await?;
            if reply.code != 220 {
                return Ok(ProbeOutcome::from_reply(ProbeStage::StartTls, &reply, false));
            }
            session.upgrade_tls(&self.tls).await?;

            let (stage, reply) = self.announce(session).await?;
            if !reply.is_positive_completion() {
                return Ok(ProbeOutcome::from_reply(stage, &reply, true));
            }
            hello = reply;
        }
        tracing::trace!(
            target: "smtp_probe",
            host = session.host(),
            greeting = %hello,
            secure = session.is_secure(),
            "session ready"
        );

        let mail = session
            .command(&format!("MAIL FROM:<{}>", self.sender), ProbeStage::MailFrom)
            .await?;
        if !mail.is_positive_completion() {
            return Ok(ProbeOutcome::from_reply(
                ProbeStage::MailFrom,
                &mail,
                session.is_secure(),
            ));
        }

        let rcpt = session
            .command(&format!("RCPT TO:<{address}>"), ProbeStage::RcptTo)
            .await?;
        Ok(ProbeOutcome::from_reply(
            ProbeStage::RcptTo,
            &rcpt,
            session.is_secure(),
        ))
    }

    /// EHLO, falling back to HELO when EHLO is permanently refused.
    async fn announce(
        &self,
        session: &mut SmtpSession,
    ) -> Result<(ProbeStage, SmtpReply), ProbeError> {
        let ehlo = session
            .command(&format!("EHLO {}", self.helo_name), ProbeStage::Ehlo)
            .await?;
        if !ehlo.is_permanent_failure() {
            return Ok((ProbeStage::Ehlo, ehlo));
        }

        let helo = session
            .command(&format!("HELO {}", self.helo_name), ProbeStage::Helo)
            .await?;
        Ok((ProbeStage::Helo, helo))
    }
}

#[async_trait]
impl Prober for SmtpProber {
    async fn probe(&self, address: &str, host: &str, candidate: &ProbeCandidate) -> ProbeOutcome {
        if let Err(err) = check_recipient(address) {
            tracing::warn!(target: "smtp_probe", host, error = %err, "refusing recipient");
            return ProbeOutcome::connection_failure(&err);
        }

        let mut session = match self.open(host, candidate).await {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!(
                    target: "smtp_probe",
                    host,
                    %candidate,
                    error = %err,
                    "could not open session"
                );
                return ProbeOutcome::connection_failure(&err);
            }
        };

        let outcome = self.probe_session(&mut session, address, candidate).await;
        tracing::debug!(
            target: "smtp_probe",
            host,
            %candidate,
            disposition = ?outcome.disposition,
            code = ?outcome.response_code,
            "probe finished"
        );
        outcome
    }
}
