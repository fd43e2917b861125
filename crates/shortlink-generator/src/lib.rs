pub mod random;
pub mod seq;

pub use random::{GeneratorError, RandomGenerator};
pub use seq::SequenceGenerator;

use shortlink_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Generated codes are not required to be unique; the store's uniqueness
/// constraint is the final arbiter.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> ShortCode;
}
