//! Optional LLM relevance filtering of merged results.
//!
//! The filter renders the merged list into a single prompt, asks an
//! external model which entries are relevant and keeps only those. Any
//! ambiguity fails open: the caller gets the unfiltered list back.
//!
//! ```text
//! Disabled ──────────────────────────► Passthrough
//! Enabled ──► Prompting ──┬──────────► Parsed
//!                         └──────────► FailedOpen
//! ```

pub mod filter;
pub mod prompt;

use async_trait::async_trait;

use crate::error::SamplingError;

pub use filter::{FilterOutcome, RelevanceFilter, SamplingFilterInput};
pub use prompt::{build_prompt, parse_selection, Selection};

/// Prompt-in / text-out access to a language model.
///
/// Implemented by the caller around whatever client it uses.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Human-readable model name for status reporting.
    fn model_name(&self) -> &str;

    /// Whether the model can currently be reached.
    fn is_available(&self) -> bool {
        true
    }

    /// Send `prompt` and return the model's raw text answer.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError`] on transport or model failure.
    async fn sample(&self, prompt: &str) -> Result<String, SamplingError>;
}
