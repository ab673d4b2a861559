//! Mock LLM 客户端（用于测试，无需 API）
//!
//! MockLlmClient 固定返回一个 reading_control/next 的 JSON Tool Call，便于本地跑通编排流程；
//! ScriptedLlmClient 按顺序回放预置回复，供测试脚本化 Agent 行为，耗尽后返回错误。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::Message;

/// Mock 客户端：固定返回「下一段」工具调用
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        Ok(r#"{"tool": "reading_control", "args": {"command": "next"}}"#.to_string())
    }
}

/// 脚本化客户端：依次弹出预置回复
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlmClient {
    pub fn new(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .ok_or_else(|| "Scripted replies exhausted".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_tool_call() {
        let reply = MockLlmClient.complete(&[]).await.unwrap();
        assert!(reply.contains("reading_control"));
    }

    #[tokio::test]
    async fn test_scripted_replays_in_order_then_errors() {
        let client = ScriptedLlmClient::new(["one", "two"]);
        assert_eq!(client.complete(&[]).await.unwrap(), "one");
        assert_eq!(client.complete(&[]).await.unwrap(), "two");
        assert!(client.complete(&[]).await.is_err());
    }
}
