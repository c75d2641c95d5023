use std::fmt;

use super::error::ProbeError;

/// A complete (possibly multi-line) SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// Text of all lines joined with a space.
    pub fn message(&self) -> String {
        self.lines.join(" ")
    }

    /// Whether an EHLO reply advertises `keyword`.
    ///
    /// The first line of an EHLO reply is the server greeting, so only the
    /// following lines are treated as extension keywords.
    pub fn has_capability(&self, keyword: &str) -> bool {
        self.lines.iter().skip(1).any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
        })
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, message)
        }
    }
}

/// One parsed line of a reply.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine<'a> {
    pub code: u16,
    pub is_final: bool,
    pub content: &'a str,
}

pub(crate) fn parse_reply_line(line: &str) -> Result<ReplyLine<'_>, ProbeError> {
    if line.len() < 3 || !line.is_char_boundary(3) {
        return Err(ProbeError::MalformedReply(line.to_string()));
    }
    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| ProbeError::MalformedReply(line.to_string()))?;
    if !(200..600).contains(&code) {
        return Err(ProbeError::MalformedReply(line.to_string()));
    }

    match line.as_bytes().get(3) {
        None => Ok(ReplyLine {
            code,
            is_final: true,
            content: "",
        }),
        Some(b' ') => Ok(ReplyLine {
            code,
            is_final: true,
            content: &line[4..],
        }),
        Some(b'-') => Ok(ReplyLine {
            code,
            is_final: false,
            content: &line[4..],
        }),
        Some(_) => Err(ProbeError::MalformedReply(line.to_string())),
    }
}
