//! Mailbox verification pipeline.
//!
//! Control flow per request: normalize, check the cache, validate format,
//! resolve MX, run the catch-all control probes, probe the real address, then
//! fold the signals into a verdict and cache it.

pub mod catch_all;
pub mod sequencer;
pub mod verdict;

#[cfg(test)]
mod verifier_test;

use std::sync::Arc;

use crate::cache::{CacheKey, ResultCache, VerdictStore};
use crate::config::AppConfig;
use crate::models::VerificationResult;
use crate::smtp::probe::{Prober, SmtpProber};
use crate::smtp::tls::build_tls_connector;
use crate::validation::dnsmx::MxResolver;
use crate::validation::syntax::EmailAddress;
use catch_all::CatchAllDetector;
use sequencer::Sequencer;
use verdict::{Signals, VerdictPolicy, aggregate};

#[derive(Clone)]
pub struct EmailVerifier {
    resolver: MxResolver,
    sequencer: Sequencer,
    catch_all: CatchAllDetector,
    cache: Arc<dyn VerdictStore>,
    policy: VerdictPolicy,
}

impl EmailVerifier {
    pub fn new(
        resolver: MxResolver,
        prober: Arc<dyn Prober>,
        cache: Arc<dyn VerdictStore>,
        policy: VerdictPolicy,
    ) -> Self {
        let sequencer = Sequencer::new(prober);
        Self {
            resolver,
            catch_all: CatchAllDetector::new(sequencer.clone()),
            sequencer,
            cache,
            policy,
        }
    }

    /// Wires the production resolver, prober and cache.
    pub fn from_config(config: &AppConfig) -> Self {
        let prober = SmtpProber::new(
            config.helo_name.clone(),
            config.smtp_timeout,
            build_tls_connector(config.tls_accept_invalid_certs),
        );
        Self::new(
            MxResolver::from_system_conf(config.dns_timeout),
            Arc::new(prober),
            Arc::new(ResultCache::new(config.cache_capacity, config.cache_ttl)),
            config.verdict_policy,
        )
    }

    pub fn cache(&self) -> &Arc<dyn VerdictStore> {
        &self.cache
    }

    /// Verifies `raw`, serving from the cache when possible.
    ///
    /// # Arguments
    /// * `raw` - Address as supplied by the caller; trimmed and lower-cased here
    /// * `skip_smtp` - Answer from format and MX checks only
    ///
    /// # Returns
    /// Always a result; every network failure degrades the verdict instead of
    /// surfacing as an error.
    pub async fn verify(&self, raw: &str, skip_smtp: bool) -> VerificationResult {
        let address = EmailAddress::parse(raw);
        let key = CacheKey::new(address.as_str(), skip_smtp);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(email = %address, skip_smtp, "served from cache");
            return cached;
        }

        let result = self.evaluate(address, skip_smtp).await;
        tracing::info!(
            email = %result.email,
            status = ?result.status,
            confidence = result.confidence_score,
            "verification finished"
        );
        self.cache.put(key, result.clone());
        result
    }

    async fn evaluate(&self, address: EmailAddress, skip_smtp: bool) -> VerificationResult {
        let valid_format = address.has_valid_format();
        let records = if valid_format {
            self.resolver.resolve(address.domain()).await
        } else {
            Vec::new()
        };
        let domain_has_mx = !records.is_empty();

        let mut is_catch_all = false;
        let mut smtp_valid = None;
        let mut diagnostic = None;

        if domain_has_mx && !skip_smtp {
            is_catch_all = self.catch_all.is_catch_all(&records, address.domain()).await;
            if !is_catch_all {
                let sequence = self.sequencer.verify(address.as_str(), &records).await;
                smtp_valid = Some(sequence.success);
                if !sequence.success {
                    diagnostic = sequence.last_outcome.map(|outcome| outcome.message);
                }
            }
        }

        let verdict = aggregate(
            &Signals {
                valid_format,
                domain_has_mx,
                is_catch_all,
                smtp_valid,
            },
            self.policy,
            diagnostic.as_deref(),
        );

        VerificationResult {
            email: address.into_string(),
            valid_format,
            domain_has_mx,
            smtp_valid,
            is_catch_all,
            status: verdict.status,
            confidence_score: verdict.confidence_score,
            warnings: verdict.warnings,
        }
    }
}
