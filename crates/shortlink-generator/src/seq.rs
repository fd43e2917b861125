use crate::Generator;
use shortlink_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic generator producing `{prefix}{counter:06}`.
///
/// Codes are unique within one instance. Useful in tests and for
/// predictable local runs.
#[derive(Debug)]
pub struct SequenceGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl SequenceGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SequenceGenerator {
    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        ShortCode::new_unchecked(format!("{}{count:06}", self.prefix))
    }
}
