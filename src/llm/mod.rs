//! LLM 层：客户端抽象与实现（Groq / OpenAI 兼容 / Mock）

pub mod groq;
pub mod mock;
pub mod openai;
pub mod traits;

pub use groq::{create_groq_client, GROQ_DEFAULT_MODEL};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::LlmClient;
