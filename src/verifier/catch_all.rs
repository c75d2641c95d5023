use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::sequencer::Sequencer;
use crate::validation::dnsmx::MxRecord;

static PROBE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local parts that cannot plausibly name a real mailbox. The timestamp and
/// process-wide counter keep them unique across calls; the index keeps the
/// pair apart.
pub fn synthetic_local_parts() -> [String; 2] {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let counter = PROBE_COUNTER.fetch_add(1, Ordering::Relaxed);
    [0, 1].map(|index| format!("verify-probe-{nanos}-{counter}-{index}"))
}

/// Detects domains that accept mail for any local part.
#[derive(Clone)]
pub struct CatchAllDetector {
    sequencer: Sequencer,
}

impl CatchAllDetector {
    pub fn new(sequencer: Sequencer) -> Self {
        Self { sequencer }
    }

    /// Probes two addresses that cannot exist on `domain`. The domain is
    /// catch-all only if both are accepted; the first rejection ends the check.
    pub async fn is_catch_all(&self, records: &[MxRecord], domain: &str) -> bool {
        if records.is_empty() {
            return false;
        }

        for local in synthetic_local_parts() {
            let address = format!("{local}@{domain}");
            let result = self.sequencer.verify(&address, records).await;
            if !result.success {
                tracing::debug!(domain, probe = %address, "synthetic recipient refused");
                return false;
            }
        }

        tracing::info!(domain, "domain is catch-all");
        true
    }
}
