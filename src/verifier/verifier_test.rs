#[cfg(test)]
mod email_verifier_tests {
    use super::super::EmailVerifier;
    use super::super::verdict::{
        VerdictPolicy, WARN_CATCH_ALL, WARN_NO_MX, WARN_SMTP_SKIPPED, WARN_UNCONFIRMED,
    };
    use crate::cache::{ResultCache, VerdictStore};
    use crate::models::{VerificationResult, VerificationStatus};
    use crate::smtp::probe::{MockProber, ProbeDisposition, ProbeOutcome};
    use crate::validation::dnsmx::{MockMxLookup, MxRecord, MxResolver};
    use std::sync::Arc;
    use std::time::Duration;

    fn resolver(records: Vec<MxRecord>, times: usize) -> MxResolver {
        let mut lookup = MockMxLookup::new();
        lookup
            .expect_lookup_mx()
            .times(times)
            .returning(move |_| Ok(records.clone()));
        MxResolver::new(Arc::new(lookup), Duration::from_secs(1))
    }

    fn no_lookup() -> MxResolver {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().times(0);
        MxResolver::new(Arc::new(lookup), Duration::from_secs(1))
    }

    fn one_host() -> Vec<MxRecord> {
        vec![MxRecord::new("mx.example.com", 10)]
    }

    fn outcome(accepted: bool) -> ProbeOutcome {
        ProbeOutcome {
            accepted,
            response_code: Some(if accepted { 250 } else { 550 }),
            message: if accepted {
                "RCPT TO replied 250 2.1.5 Ok".to_string()
            } else {
                "RCPT TO replied 550 5.1.1 User unknown".to_string()
            },
            disposition: if accepted {
                ProbeDisposition::Accepted
            } else {
                ProbeDisposition::Rejected
            },
            secure: false,
        }
    }

    /// Accepts only the real address; the synthetic catch-all probes are refused.
    fn accepts_only(real: &'static str) -> MockProber {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(move |address, _, _| outcome(address == real));
        prober
    }

    fn verifier(resolver: MxResolver, prober: MockProber) -> EmailVerifier {
        EmailVerifier::new(
            resolver,
            Arc::new(prober),
            Arc::new(ResultCache::new(100, Duration::from_secs(60))),
            VerdictPolicy::Optimistic,
        )
    }

    fn no_probes() -> MockProber {
        let mut prober = MockProber::new();
        prober.expect_probe().times(0);
        prober
    }

    #[tokio::test]
    async fn test_no_mx_end_to_end() {
        let verifier = verifier(resolver(Vec::new(), 1), no_probes());

        let result = verifier.verify("USER@Example.com ", false).await;
        assert_eq!(
            result,
            VerificationResult {
                email: "user@example.com".to_string(),
                valid_format: true,
                domain_has_mx: false,
                smtp_valid: None,
                is_catch_all: false,
                status: VerificationStatus::Invalid,
                confidence_score: 0,
                warnings: vec![WARN_NO_MX.to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_format_skips_dns() {
        let verifier = verifier(no_lookup(), no_probes());

        for raw in ["plainaddress", "user@localhost", "a b@example.com"] {
            let result = verifier.verify(raw, false).await;
            assert!(!result.valid_format, "{raw}");
            assert!(!result.domain_has_mx);
            assert_eq!(result.status, VerificationStatus::Invalid);
            assert_eq!(result.confidence_score, 0);
        }
    }

    #[tokio::test]
    async fn test_confirmed_mailbox_is_valid() {
        let verifier = verifier(resolver(one_host(), 1), accepts_only("user@example.com"));

        let result = verifier.verify("user@example.com", false).await;
        assert_eq!(result.smtp_valid, Some(true));
        assert!(!result.is_catch_all);
        assert_eq!(result.status, VerificationStatus::Valid);
        assert_eq!(result.confidence_score, 100);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_catch_all_domain_never_probes_real_address() {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .withf(|address, _, _| address.starts_with("verify-probe-"))
            .times(2)
            .returning(|_, _, _| outcome(true));

        let verifier = verifier(resolver(one_host(), 1), prober);
        let result = verifier.verify("user@example.com", false).await;

        assert!(result.is_catch_all);
        assert_eq!(result.smtp_valid, None);
        assert_eq!(result.status, VerificationStatus::Unknown);
        assert_eq!(result.confidence_score, 50);
        assert_eq!(result.warnings, [WARN_CATCH_ALL]);
    }

    #[tokio::test]
    async fn test_unconfirmed_carries_diagnostic() {
        let mut prober = MockProber::new();
        prober.expect_probe().returning(|_, _, _| outcome(false));

        let verifier = verifier(resolver(one_host(), 1), prober);
        let result = verifier.verify("user@example.com", false).await;

        assert_eq!(result.smtp_valid, Some(false));
        assert_eq!(result.status, VerificationStatus::LikelyValid);
        assert_eq!(result.confidence_score, 75);
        assert_eq!(
            result.warnings,
            [WARN_UNCONFIRMED, "RCPT TO replied 550 5.1.1 User unknown"]
        );
    }

    #[tokio::test]
    async fn test_strict_policy() {
        let mut prober = MockProber::new();
        prober.expect_probe().returning(|_, _, _| outcome(false));

        let verifier = EmailVerifier::new(
            resolver(one_host(), 1),
            Arc::new(prober),
            Arc::new(ResultCache::new(100, Duration::from_secs(60))),
            VerdictPolicy::Strict,
        );
        let result = verifier.verify("user@example.com", false).await;

        assert_eq!(result.status, VerificationStatus::LikelyInvalid);
        assert_eq!(result.confidence_score, 40);
    }

    #[tokio::test]
    async fn test_skip_smtp_uses_format_and_mx_only() {
        let verifier = verifier(resolver(one_host(), 1), no_probes());

        let result = verifier.verify("user@example.com", true).await;
        assert!(result.domain_has_mx);
        assert_eq!(result.smtp_valid, None);
        assert_eq!(result.status, VerificationStatus::Unknown);
        assert_eq!(result.warnings, [WARN_SMTP_SKIPPED]);
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        // one lookup in total; the second call must not resolve again
        let verifier = verifier(resolver(one_host(), 1), accepts_only("user@example.com"));

        let first = verifier.verify("user@example.com", false).await;
        let second = verifier.verify("  User@Example.COM", false).await;

        assert_eq!(first, second);
        assert_eq!(verifier.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_mode_cached_separately() {
        let verifier = verifier(resolver(one_host(), 2), accepts_only("user@example.com"));

        let probed = verifier.verify("user@example.com", false).await;
        let skipped = verifier.verify("user@example.com", true).await;

        assert_eq!(probed.status, VerificationStatus::Valid);
        assert_eq!(skipped.status, VerificationStatus::Unknown);
        assert_eq!(verifier.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed() {
        let verifier = EmailVerifier::new(
            resolver(Vec::new(), 2),
            Arc::new(no_probes()),
            Arc::new(ResultCache::new(100, Duration::from_millis(30))),
            VerdictPolicy::Optimistic,
        );

        verifier.verify("user@example.com", false).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        verifier.verify("user@example.com", false).await;
    }
}
