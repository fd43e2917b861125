use crate::Generator;
use rand::distr::{Alphanumeric, SampleString};
use shortlink_core::shortcode::MAX_LENGTH;
use shortlink_core::ShortCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("code length must be between 1 and 32, got {0}")]
    InvalidLength(usize),
}

/// Draws each character uniformly and independently from `[a-zA-Z0-9]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(GeneratorError::InvalidLength(length));
        }
        Ok(Self { length })
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let code = Alphanumeric.sample_string(&mut rand::rng(), self.length);
        ShortCode::new_unchecked(code)
    }
}
