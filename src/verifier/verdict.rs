use std::fmt;
use std::str::FromStr;

use crate::models::VerificationStatus;

pub const WARN_INVALID_FORMAT: &str = "Invalid email format";
pub const WARN_NO_MX: &str = "No MX records found";
pub const WARN_CATCH_ALL: &str = "Domain accepts all addresses (catch-all); mailbox cannot be confirmed";
pub const WARN_SMTP_SKIPPED: &str = "SMTP verification skipped";
pub const WARN_UNCONFIRMED: &str = "SMTP server did not confirm the mailbox";

/// How to read "SMTP did not confirm the address".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerdictPolicy {
    /// `likely_valid` at 75: many servers refuse RCPT probes from strangers.
    #[default]
    Optimistic,
    /// `likely_invalid` at 40.
    Strict,
}

impl VerdictPolicy {
    fn unconfirmed(self) -> (VerificationStatus, u8) {
        match self {
            Self::Optimistic => (VerificationStatus::LikelyValid, 75),
            Self::Strict => (VerificationStatus::LikelyInvalid, 40),
        }
    }
}

impl FromStr for VerdictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown verdict policy '{other}'")),
        }
    }
}

impl fmt::Display for VerdictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimistic => "optimistic",
            Self::Strict => "strict",
        })
    }
}

/// Observed facts about an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub valid_format: bool,
    pub domain_has_mx: bool,
    pub is_catch_all: bool,
    /// `None` when probing did not run.
    pub smtp_valid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerificationStatus,
    pub confidence_score: u8,
    pub warnings: Vec<String>,
}

impl Verdict {
    fn new(status: VerificationStatus, confidence_score: u8, warnings: &[&str]) -> Self {
        Self {
            status,
            confidence_score,
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Folds the signals into a status and score. First matching row wins:
///
/// | format | MX | catch-all | SMTP    | status                        | score   |
/// |--------|----|-----------|---------|-------------------------------|---------|
/// | no     |    |           |         | invalid                       | 0       |
/// | yes    | no |           |         | invalid                       | 0       |
/// | yes    | yes| yes       |         | unknown                       | 50      |
/// | yes    | yes| no        | skipped | unknown                       | 50      |
/// | yes    | yes| no        | yes     | valid                         | 100     |
/// | yes    | yes| no        | no      | likely_valid / likely_invalid | 75 / 40 |
///
/// `diagnostic` is appended to the warnings of the last row only.
pub fn aggregate(signals: &Signals, policy: VerdictPolicy, diagnostic: Option<&str>) -> Verdict {
    if !signals.valid_format {
        return Verdict::new(VerificationStatus::Invalid, 0, &[WARN_INVALID_FORMAT]);
    }
    if !signals.domain_has_mx {
        return Verdict::new(VerificationStatus::Invalid, 0, &[WARN_NO_MX]);
    }
    if signals.is_catch_all {
        return Verdict::new(VerificationStatus::Unknown, 50, &[WARN_CATCH_ALL]);
    }

    match signals.smtp_valid {
        None => Verdict::new(VerificationStatus::Unknown, 50, &[WARN_SMTP_SKIPPED]),
        Some(true) => Verdict::new(VerificationStatus::Valid, 100, &[]),
        Some(false) => {
            let (status, score) = policy.unconfirmed();
            let mut verdict = Verdict::new(status, score, &[WARN_UNCONFIRMED]);
            if let Some(diagnostic) = diagnostic.filter(|d| !d.is_empty()) {
                verdict.warnings.push(diagnostic.to_string());
            }
            verdict
        }
    }
}
