/// Port and transport-security combinations tried against each mail host.
pub mod candidate;

pub mod error;

/// Single-host mailbox probe.
///
/// A probe walks the SMTP dialogue up to `RCPT TO` and reports how the server
/// answered, without ever sending message data:
/// 1. Connects (wrapping in TLS first for implicit-TLS candidates)
/// 2. Reads the greeting and announces itself with EHLO, or HELO as fallback
/// 3. Upgrades with STARTTLS when requested and advertised
/// 4. Issues `MAIL FROM` and `RCPT TO`, then QUITs
///
/// # Examples
/// ```no_run
/// # async fn example() {
/// use email_verifier::smtp::candidate::ProbeCandidate;
/// use email_verifier::smtp::probe::{Prober, SmtpProber};
/// use email_verifier::smtp::tls::build_tls_connector;
/// use std::time::Duration;
///
/// let prober = SmtpProber::new("verifier.example.net", Duration::from_secs(10), build_tls_connector(true));
/// let outcome = prober
///     .probe("user@example.com", "mx.example.com", &ProbeCandidate::RELAY)
///     .await;
/// println!("{:?} {}", outcome.disposition, outcome.message);
/// # }
/// ```
pub mod probe;

pub mod reply;
pub mod session;
pub mod tls;
