//! Model providers.
//!
//! Only Gemini is implemented. The driver talks to it through
//! [`GenerativeModel`] so tests can substitute a scripted model.

use std::future::Future;

use anyhow::Result;
use gemexec_types::{GenerationRequest, GenerationResponse};

pub mod gemini;
pub mod shared;

pub use shared::{
    ProviderError, ProviderErrorKind, USER_AGENT, classify_reqwest_error, resolve_api_key,
    resolve_base_url,
};

/// A remote model that answers a single generate-content request.
pub trait GenerativeModel {
    /// Issues one request and waits for the full response. No retry, no timeout.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or an
    /// unparseable body.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse>> + Send;
}
