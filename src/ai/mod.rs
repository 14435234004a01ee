//! Model capability used by the dispatcher
//!
//! The gateway treats the generative model as an opaque, fallible service
//! with two call shapes: text in, text out; and text plus an inline binary
//! payload in, text out.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockGenerativeClient;

use crate::models::InlinePayload;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerativeService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    async fn generate_with_inline(&self, prompt: &str, payload: &InlinePayload)
        -> Result<String>;
}
