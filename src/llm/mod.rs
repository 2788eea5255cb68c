//! LLM integration module

pub mod client;
pub mod prompts;
pub mod schema;
pub mod validator;

pub use client::{GeminiTransport, InferenceClient, InferenceRequest, InferenceTransport};
pub use prompts::{AnalysisRequest, PromptBuilder, RenderedPrompt};
pub use schema::SchemaDescriptor;
pub use validator::{AnalysisResult, ResponseValidator, WeakBulletPoint};
