//! 错误类型
//!
//! 分四类：上游失败（LLM 调用 / 网络）、AI 输出无效（JSON 坏 / 引用悬空 / 字段缺失）、
//! 转写失败、配置错误。未配置 AI 不是错误而是一等状态，由编排器直接返回固定话术；
//! 未识别的用户命令也不是错误，各处理器自带确定性的兜底分支。

use thiserror::Error;

/// 编排与问答链路中可能出现的错误
#[derive(Error, Debug)]
pub enum TutorError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// AI 输出通过了 JSON 解析但未通过校验（如无引用且无澄清问题）
    #[error("Invalid AI answer: {0}")]
    InvalidAnswer(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ToolFailed(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),
}
