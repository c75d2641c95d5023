use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::ResolveError,
    system_conf::read_system_conf,
};

/// A mail exchanger for a domain and its relative preference (lower is preferred).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecord {
    pub exchange: String,
    pub priority: u16,
}

impl MxRecord {
    pub fn new(exchange: impl Into<String>, priority: u16) -> Self {
        Self {
            exchange: exchange.into(),
            priority,
        }
    }
}

/// Raw MX lookup against some DNS backend.
///
/// Implementations report resolver errors as-is; [`MxResolver`] decides what
/// they mean for verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

#[async_trait]
impl MxLookup for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.mx_lookup(domain).await?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(normalize_exchange(&mx.exchange().to_utf8()), mx.preference()))
            .collect())
    }
}

/// Resolves a domain to its ordered mail exchangers.
///
/// Resolution never fails outward: NXDOMAIN, timeouts, malformed answers and
/// empty answers all come back as an empty list, since every one of them means
/// the pipeline cannot proceed.
#[derive(Clone)]
pub struct MxResolver {
    lookup: Arc<dyn MxLookup>,
    timeout: Duration,
}

impl MxResolver {
    pub fn new(lookup: Arc<dyn MxLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Builds a resolver from the system DNS configuration.
    pub fn from_system_conf(timeout: Duration) -> Self {
        Self::new(Arc::new(create_resolver(timeout)), timeout)
    }

    /// Looks up MX records for `domain`.
    ///
    /// # Arguments
    /// * `domain` - Domain name to query (without the `@` symbol)
    ///
    /// # Returns
    /// Records sorted ascending by priority, ties kept in resolver order. Null MX
    /// entries (RFC 7505) are dropped. Any failure yields an empty list.
    pub async fn resolve(&self, domain: &str) -> Vec<MxRecord> {
        if domain.is_empty() {
            return Vec::new();
        }

        match tokio::time::timeout(self.timeout, self.lookup.lookup_mx(domain)).await {
            Ok(Ok(records)) => {
                let records = order_records(records);
                tracing::debug!(domain, count = records.len(), "resolved MX records");
                records
            }
            Ok(Err(err)) => {
                tracing::debug!(domain, error = %err, "MX lookup failed");
                Vec::new()
            }
            Err(_) => {
                tracing::debug!(domain, timeout = ?self.timeout, "MX lookup timed out");
                Vec::new()
            }
        }
    }
}

/// Creates a DNS resolver from the system configuration
///
/// Configures resolver with:
/// - half the overall lookup budget per request
/// - 2 attempts
/// - Default resolver configuration when the system one cannot be read
fn create_resolver(timeout: Duration) -> TokioAsyncResolver {
    let (config, mut opts) = read_system_conf().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to default resolver configuration");
        (ResolverConfig::default(), ResolverOpts::default())
    });
    opts.timeout = timeout / 2;
    opts.attempts = 2;

    TokioAsyncResolver::tokio(config, opts)
}

fn order_records(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.retain(|record| !record.exchange.is_empty());
    // stable: equal priorities keep the order the resolver returned
    records.sort_by_key(|record| record.priority);
    records
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_dns_resolver::error::ResolveErrorKind;

    fn resolver_with(mock: MockMxLookup) -> MxResolver {
        MxResolver::new(Arc::new(mock), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_records_sorted_by_priority() {
        let mut mock = MockMxLookup::new();
        mock.expect_lookup_mx()
            .withf(|domain| domain == "example.com")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    MxRecord::new("mx3.example.com", 30),
                    MxRecord::new("mx1.example.com", 10),
                    MxRecord::new("mx2.example.com", 20),
                ])
            });

        let records = resolver_with(mock).resolve("example.com").await;
        let hosts: Vec<&str> = records.iter().map(|r| r.exchange.as_str()).collect();
        assert_eq!(hosts, ["mx1.example.com", "mx2.example.com", "mx3.example.com"]);
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_resolver_order() {
        let mut mock = MockMxLookup::new();
        mock.expect_lookup_mx().returning(|_| {
            Ok(vec![
                MxRecord::new("b.example.com", 10),
                MxRecord::new("c.example.com", 5),
                MxRecord::new("a.example.com", 10),
            ])
        });

        let records = resolver_with(mock).resolve("example.com").await;
        let hosts: Vec<&str> = records.iter().map(|r| r.exchange.as_str()).collect();
        assert_eq!(hosts, ["c.example.com", "b.example.com", "a.example.com"]);
    }

    #[tokio::test]
    async fn test_resolution_error_is_empty() {
        let mut mock = MockMxLookup::new();
        mock.expect_lookup_mx()
            .returning(|_| Err(ResolveErrorKind::Message("nxdomain").into()));

        assert!(resolver_with(mock).resolve("nope.invalid").await.is_empty());
    }

    #[tokio::test]
    async fn test_null_mx_is_dropped() {
        let mut mock = MockMxLookup::new();
        mock.expect_lookup_mx()
            .returning(|_| Ok(vec![MxRecord::new(normalize_exchange("."), 0)]));

        assert!(resolver_with(mock).resolve("example.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_domain_skips_lookup() {
        let mut mock = MockMxLookup::new();
        mock.expect_lookup_mx().times(0);

        assert!(resolver_with(mock).resolve("").await.is_empty());
    }

    struct StalledLookup;

    #[async_trait]
    impl MxLookup for StalledLookup {
        async fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![MxRecord::new("late.example.com", 10)])
        }
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_empty() {
        let resolver = MxResolver::new(Arc::new(StalledLookup), Duration::from_millis(20));
        assert!(resolver.resolve("example.com").await.is_empty());
    }

    #[test]
    fn test_normalize_exchange_trims_dot_and_lowercases() {
        assert_eq!(normalize_exchange("Mail.EXAMPLE.com."), "mail.example.com");
        assert_eq!(normalize_exchange("."), "");
    }
}
