use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Permissive address shape: `x@y.z` where no segment holds whitespace or `@`.
static FORMAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("address pattern is a valid regex")
});

/// Checks whether a candidate address has the shape of an email address.
///
/// This is a cheap pre-filter, not an RFC 5322 validator. It accepts any string of
/// the form `local@domain.tld` where each segment is one or more characters that are
/// neither whitespace nor `@`. Many structurally invalid addresses (`a..b@c.d`,
/// `"@x.y`) pass; anything missing the `@` or a dot after it fails.
///
/// # Arguments
/// * `email` - The candidate address. It is matched as given; callers normalize first.
///
/// # Returns
/// `true` if the string matches the permissive grammar, `false` otherwise
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::is_valid_format;
///
/// assert!(is_valid_format("user@example.com"));
/// assert!(!is_valid_format("user@localhost"));
/// assert!(!is_valid_format("user example.com"));
/// ```
pub fn is_valid_format(email: &str) -> bool {
    FORMAT_PATTERN.is_match(email)
}

/// A normalized candidate address.
///
/// Normalization trims surrounding whitespace and lower-cases the whole address.
/// The value is immutable once constructed; `local_part` and `domain` are views
/// split on the last `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    value: String,
    at: Option<usize>,
}

impl EmailAddress {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        let at = value.rfind('@');
        Self { value, at }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn local_part(&self) -> &str {
        match self.at {
            Some(at) => &self.value[..at],
            None => &self.value,
        }
    }

    pub fn domain(&self) -> &str {
        match self.at {
            Some(at) => &self.value[at + 1..],
            None => "",
        }
    }

    pub fn has_valid_format(&self) -> bool {
        is_valid_format(&self.value)
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
