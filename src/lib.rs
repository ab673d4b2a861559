//! Lumen - 面向视障学生的语音朗读助教
//!
//! 将语音转写文本 + 客户端导航状态编排为结构化动作（导航 / 模式切换 / 朗读回复）。
//! 模块划分：
//! - **agent**: 工具调用 Agent（LLM 判定 → ToolCall 或直接回复）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 动作 Schema、语音状态、导航上下文、错误类型、编排器
//! - **document**: chunk 实体与只读文档存储
//! - **llm**: LLM 客户端抽象与实现（Groq / OpenAI 兼容 / Mock）
//! - **memory**: 按文档键控的有界问答历史
//! - **qa**: 词面检索兜底、AI 接地回答与降级级联
//! - **speech**: 语音转写抽象与 Deepgram 实现
//! - **tools**: 四个可调用工具（阅读 / 问答 / 公式 / 视觉）与注册表

pub mod agent;
pub mod config;
pub mod core;
pub mod document;
pub mod llm;
pub mod memory;
pub mod qa;
pub mod speech;
pub mod tools;

pub use crate::core::{
    build_navigation_context, ActionKind, Mode, NavigationContext, Orchestrator, SpecialSignal,
    TutorError, VoiceAction, VoiceState,
};
