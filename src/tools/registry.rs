//! 工具注册表
//!
//! 四个工具（reading_control / ask_question / formula_control / visual_control）实现
//! Tool trait（name / description / execute），由 ToolRegistry 按名注册与查找。
//! 请求级状态通过 RequestContext 显式传入每次 execute，不依赖进程级共享变量。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{RequestContext, TutorError, VoiceAction};

/// 工具 trait：名称、描述（供 LLM 理解）、异步执行（args 为 JSON，ctx 为请求级上下文）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能与命令词汇）
    fn description(&self) -> &str;

    /// 执行工具，产出统一的 VoiceAction
    async fn execute(&self, args: Value, ctx: &RequestContext<'_>) -> Result<VoiceAction, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>，支持 register / get / execute / tool_descriptions
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// 执行指定工具；未注册转 UnknownTool（幻觉工具名），工具返回 Err 则转 ToolFailed
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &RequestContext<'_>,
    ) -> Result<VoiceAction, TutorError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| TutorError::UnknownTool(name.to_string()))?;
        tool.execute(args, ctx).await.map_err(TutorError::ToolFailed)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// 返回按名称排序的 (name, description) 列表，用于生成系统提示词的工具段落
    /// （排序保证提示词确定性）
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        let mut descriptions: Vec<(String, String)> = self
            .tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect();
        descriptions.sort();
        descriptions
    }
}
