//! LLM 客户端抽象
//!
//! 所有后端（Groq / OpenAI 兼容 / Mock）实现 LlmClient；编排链路只用非流式 complete，
//! 外部调用的超时由 HTTP 客户端配置承担，超时与网络错误同样走降级路径。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
