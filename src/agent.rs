//! 工具调用 Agent：意图判定与 Tool Call 解析
//!
//! 调用 LLM 得到回复或 JSON Tool Call；parse_agent_reply 从文本中提取 JSON 并解析为
//! ToolCall 或直接回复。二者是显式的二选一变体，编排器按变体分派。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::TutorError;
use crate::llm::LlmClient;
use crate::memory::Message;

/// LLM 返回的 Tool Call（简化 JSON：{"tool": "reading_control", "args": {"command": "next"}}）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Agent 判定结果：结构化工具调用，或对话式直接回复
#[derive(Debug, Clone)]
pub enum AgentReply {
    ToolCall(ToolCall),
    Reply(String),
}

/// 解析 LLM 输出：若含有效 JSON 且 tool 非空则为 ToolCall，否则为 Reply
pub fn parse_agent_reply(output: &str) -> Result<AgentReply, TutorError> {
    let trimmed = output.trim();

    // 尝试提取 JSON 块（```json ... ``` 或纯 JSON）
    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            &trimmed[start..=end]
        } else {
            trimmed
        }
    } else {
        return Ok(AgentReply::Reply(trimmed.to_string()));
    };

    let parsed: ToolCall = serde_json::from_str(json_str)
        .map_err(|e| TutorError::JsonParse(format!("{}: {}", e, json_str)))?;

    if parsed.tool.is_empty() {
        Ok(AgentReply::Reply(trimmed.to_string()))
    } else {
        Ok(AgentReply::ToolCall(parsed))
    }
}

/// 持有 LLM 的工具调用 Agent：拼 system + 转写文本后调用 LLM 并解析判定结果
pub struct ToolAgent {
    llm: Arc<dyn LlmClient>,
}

impl ToolAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    /// 判定一条转写文本应走哪个工具（或直接回复）
    pub async fn decide(&self, system: &str, transcript: &str) -> Result<AgentReply, TutorError> {
        let messages = vec![Message::system(system), Message::user(transcript)];
        let raw = self
            .llm
            .complete(&messages)
            .await
            .map_err(TutorError::Llm)?;
        parse_agent_reply(&raw)
    }
}
