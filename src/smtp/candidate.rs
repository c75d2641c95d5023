use std::fmt;

/// A port and transport-security mode to try against one mail host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeCandidate {
    pub port: u16,
    /// TLS from the first byte (SMTPS).
    pub use_implicit_tls: bool,
    /// Upgrade with STARTTLS when the server advertises it.
    pub use_opportunistic_tls: bool,
}

impl ProbeCandidate {
    pub const SUBMISSION_STARTTLS: Self = Self::new(587, false, true);
    pub const SUBMISSIONS: Self = Self::new(465, true, false);
    pub const RELAY: Self = Self::new(25, false, false);

    pub const fn new(port: u16, use_implicit_tls: bool, use_opportunistic_tls: bool) -> Self {
        Self {
            port,
            use_implicit_tls,
            use_opportunistic_tls,
        }
    }

    /// Candidates in the order they are attempted against every host.
    pub fn policy() -> &'static [ProbeCandidate] {
        &POLICY
    }
}

const POLICY: [ProbeCandidate; 3] = [
    ProbeCandidate::SUBMISSION_STARTTLS,
    ProbeCandidate::SUBMISSIONS,
    ProbeCandidate::RELAY,
];

impl fmt::Display for ProbeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.use_implicit_tls {
            "implicit TLS"
        } else if self.use_opportunistic_tls {
            "STARTTLS"
        } else {
            "plaintext"
        };
        write!(f, "{} ({})", self.port, mode)
    }
}
