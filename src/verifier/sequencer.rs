use std::sync::Arc;

use crate::smtp::candidate::ProbeCandidate;
use crate::smtp::probe::{ProbeOutcome, Prober};
use crate::validation::dnsmx::MxRecord;

/// Where (if anywhere) an address was accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceResult {
    pub success: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secure: Option<bool>,
    /// The accepting outcome, or the last failed one after exhaustion.
    pub last_outcome: Option<ProbeOutcome>,
}

/// Sweeps every mail host and, per host, every probe candidate in order,
/// stopping at the first acceptance.
#[derive(Clone)]
pub struct Sequencer {
    prober: Arc<dyn Prober>,
    candidates: Vec<ProbeCandidate>,
}

impl Sequencer {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self::with_candidates(prober, ProbeCandidate::policy().to_vec())
    }

    pub fn with_candidates(prober: Arc<dyn Prober>, candidates: Vec<ProbeCandidate>) -> Self {
        Self { prober, candidates }
    }

    pub async fn verify(&self, address: &str, records: &[MxRecord]) -> SequenceResult {
        let mut last_outcome = None;

        for record in records {
            for candidate in &self.candidates {
                let outcome = self
                    .prober
                    .probe(address, &record.exchange, candidate)
                    .await;

                if outcome.accepted {
                    tracing::debug!(
                        address,
                        host = %record.exchange,
                        %candidate,
                        "recipient accepted"
                    );
                    return SequenceResult {
                        success: true,
                        host: Some(record.exchange.clone()),
                        port: Some(candidate.port),
                        secure: Some(outcome.secure),
                        last_outcome: Some(outcome),
                    };
                }

                tracing::trace!(
                    address,
                    host = %record.exchange,
                    %candidate,
                    disposition = ?outcome.disposition,
                    message = %outcome.message,
                    "candidate exhausted"
                );
                last_outcome = Some(outcome);
            }
        }

        SequenceResult {
            last_outcome,
            ..SequenceResult::default()
        }
    }
}
