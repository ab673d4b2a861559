//! 编排器：每次语音请求的主控入口
//!
//! 负责：选择 LLM 后端、注册四个工具、构建系统提示词（含模式速查表），
//! 调用工具 Agent 判定意图并分派到对应工具；未配置 AI 时走唯一的全确定性路径，
//! 任何异常都在此边界收敛为道歉话术，orchestrate 对调用方从不失败。
//! 编排器自身不修改模式，模式切换作为指令返回、由客户端应用。

use std::sync::Arc;

use crate::agent::{AgentReply, ToolAgent};
use crate::config::AppConfig;
use crate::core::{Mode, NavigationContext, RequestContext, VoiceAction, VoiceState};
use crate::llm::{create_groq_client, LlmClient, OpenAiClient};
use crate::memory::ConversationMemory;
use crate::qa::{GroundedQa, GroundedStrategy, LexicalStrategy, QaCascade};
use crate::tools::{AskTool, FormulaTool, ReadingTool, ToolRegistry, VisualTool};

/// 未配置 AI 时的固定响应
const AI_UNAVAILABLE_SPEECH: &str = "AI is not available. Please use the buttons.";
/// 空转写（没听清）时的固定响应，不触发 Agent
const EMPTY_TRANSCRIPT_SPEECH: &str = "I didn't catch that. Tap and try again.";
/// 编排边界兜底话术：Agent 或工具分派的任何异常收敛到这里
const GENERIC_FAILURE_SPEECH: &str = "Sorry, something went wrong. Please try again.";
/// Agent 返回空文本时的提示
const EMPTY_REPLY_SPEECH: &str = "I didn't understand that. Say Help for options.";
/// 系统提示词中当前 chunk 文本的预览长度（字符）
const CHUNK_PREVIEW_CHARS: usize = 200;

/// 根据配置与环境变量选择 LLM 后端（Groq / OpenAI 兼容）；无任何 API Key 时返回 None，
/// 「未配置」是一等状态而非错误
pub fn create_llm_from_config(cfg: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    let provider = cfg.llm.provider.to_lowercase();
    let use_groq = std::env::var("GROQ_API_KEY").is_ok();
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "groq";

    if use_groq {
        let model = cfg
            .llm
            .model
            .clone()
            .unwrap_or_else(|| crate::llm::GROQ_DEFAULT_MODEL.to_string());
        tracing::info!("Using Groq LLM ({})", model);
        Some(Arc::new(
            create_groq_client(Some(&model)).with_timeout(cfg.llm.timeouts.request),
        ))
    } else if use_openai {
        let model = cfg
            .llm
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI-compatible LLM ({})", model);
        Some(Arc::new(
            OpenAiClient::new(
                base,
                &model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
            )
            .with_timeout(cfg.llm.timeouts.request),
        ))
    } else {
        tracing::warn!("No API key set, voice commands will get the buttons fallback");
        None
    }
}

/// 模式速查表：自然说法 → 工具命令 token 的映射，Agent 只能产出固定词汇
fn cheat_sheet(mode: Mode) -> &'static str {
    match mode {
        Mode::Reading => {
            "\"keep going\", \"continue\", \"next\" -> reading_control next\n\
             \"go back\", \"previous\" -> reading_control back\n\
             \"where am i\", \"what page is this\" -> reading_control where_am_i\n\
             \"say that again\", \"repeat\" -> reading_control repeat\n\
             \"help\", \"what can i say\" -> reading_control help\n\
             \"stop\", \"be quiet\" -> reading_control stop\n\
             \"summarize\", \"sum up this page\" -> reading_control summarize\n\
             \"end the lecture\", \"we're finished\" -> reading_control end"
        }
        Mode::Formula => {
            "\"what do the symbols mean\" -> formula_control symbols\n\
             \"give me an example\", \"worked example\" -> formula_control example\n\
             \"explain it simply\", \"the intuition\" -> formula_control intuition\n\
             \"why is this used\", \"what is it for\" -> formula_control purpose\n\
             \"continue\", \"back to reading\" -> formula_control continue\n\
             \"help\" -> reading_control help"
        }
        Mode::Visual => {
            "\"start exploring\", \"explore the figure\" -> visual_control start_exploring\n\
             \"what is here\", \"what's this\" -> visual_control what_is_here\n\
             \"describe it\", \"describe the figure\" -> visual_control describe\n\
             \"mark this\" -> visual_control mark\n\
             \"guide me to ...\" -> visual_control guide_to (put the feature in target)\n\
             \"next key point\" -> visual_control next_key_point\n\
             \"i'm done\" -> visual_control done\n\
             \"exit now\" -> visual_control quick_exit\n\
             \"help\" -> reading_control help"
        }
    }
}

/// 编排器：持有可选的工具 Agent 与工具注册表；每次请求单线程跑完
pub struct Orchestrator {
    agent: Option<ToolAgent>,
    registry: ToolRegistry,
    memory: Arc<ConversationMemory>,
}

impl Orchestrator {
    /// 由可选 LLM 组装：问答级联在有 LLM 时为「接地 AI → 词面」，否则仅词面
    pub fn new(llm: Option<Arc<dyn LlmClient>>, cfg: &AppConfig) -> Self {
        let memory = Arc::new(ConversationMemory::new());

        let mut strategies: Vec<Box<dyn crate::qa::AnswerStrategy>> = Vec::new();
        if let Some(llm) = &llm {
            strategies.push(Box::new(GroundedStrategy::new(GroundedQa::new(llm.clone()))));
        }
        strategies.push(Box::new(LexicalStrategy));

        let mut registry = ToolRegistry::new();
        registry.register(ReadingTool);
        registry.register(FormulaTool);
        registry.register(VisualTool);
        registry.register(AskTool::new(
            QaCascade::new(strategies),
            memory.clone(),
            cfg.qa.history_limit,
        ));

        Self {
            agent: llm.map(ToolAgent::new),
            registry,
            memory,
        }
    }

    /// 从配置与环境变量组装（生产路径）
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(create_llm_from_config(cfg), cfg)
    }

    /// 会话记忆句柄（测试与监控用）
    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    /// Agent 累计 token 使用统计，未配置时为 (0, 0, 0)
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.agent
            .as_ref()
            .map(|a| a.token_usage())
            .unwrap_or((0, 0, 0))
    }

    /// 系统提示词：当前模式、位置、可选公式步骤、chunk 文本窗口、工具列表与模式速查表
    fn build_system_prompt(&self, state: &VoiceState, nav: &NavigationContext) -> String {
        let mut prompt = format!(
            "You are an accessibility-first tutor controlling a voice-first reading app for visually impaired students.\n\n\
             Current state: mode={}, page {} of {}, chunk {} of {}.\n",
            state.mode.as_str(),
            state.page_no,
            nav.total_pages,
            state.chunk_index + 1,
            nav.total_chunks,
        );
        if let Some(step) = &state.formula_step {
            prompt.push_str(&format!("Formula step: {}\n", step));
        }
        if !nav.chunk_text.is_empty() {
            let preview: String = nav.chunk_text.chars().take(CHUNK_PREVIEW_CHARS).collect();
            prompt.push_str(&format!("Current text: \"{}\"\n", preview));
        }

        prompt.push_str("\nGiven the student's voice command, decide which tool to call:\n");
        for (name, description) in self.registry.tool_descriptions() {
            let current = match (name.as_str(), state.mode) {
                ("formula_control", Mode::Formula) | ("visual_control", Mode::Visual) => {
                    " — CURRENT MODE"
                }
                _ => "",
            };
            prompt.push_str(&format!("- {}: {}{}\n", name, description, current));
        }

        prompt.push_str(&format!(
            "\nCommand cheat sheet for the current mode:\n{}\n\n\
             To call a tool, respond with ONLY a single JSON object: {{\"tool\": \"<name>\", \"args\": {{...}}}}\n\
             If the command is conversational or doesn't match any tool, respond directly in 1-2 spoken sentences.\n\
             Keep all responses concise — they will be spoken aloud.\n\
             IMPORTANT: Always respond. Never return empty.",
            cheat_sheet(state.mode)
        ));
        prompt
    }

    /// 唯一入口：转写文本 + 客户端状态 + 导航上下文 → VoiceAction，从不返回错误
    pub async fn orchestrate(
        &self,
        transcript: &str,
        state: &VoiceState,
        nav: &NavigationContext,
    ) -> VoiceAction {
        if transcript.trim().is_empty() {
            return VoiceAction::speech(EMPTY_TRANSCRIPT_SPEECH);
        }

        let Some(agent) = &self.agent else {
            return VoiceAction::speech(AI_UNAVAILABLE_SPEECH);
        };

        let system_prompt = self.build_system_prompt(state, nav);

        match agent.decide(&system_prompt, transcript).await {
            Ok(AgentReply::ToolCall(call)) => {
                tracing::info!(tool = %call.tool, "Agent selected tool");
                let ctx = RequestContext { state, nav };
                match self.registry.execute(&call.tool, call.args, &ctx).await {
                    Ok(action) => action,
                    Err(e) => {
                        tracing::warn!(tool = %call.tool, error = %e, "Tool dispatch failed");
                        VoiceAction::speech(GENERIC_FAILURE_SPEECH)
                    }
                }
            }
            Ok(AgentReply::Reply(text)) => {
                let reply = text.trim();
                if reply.is_empty() {
                    VoiceAction::speech(EMPTY_REPLY_SPEECH)
                } else {
                    VoiceAction::speech(reply)
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Orchestrator error");
                VoiceAction::speech(GENERIC_FAILURE_SPEECH)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_navigation_context, ActionKind};
    use crate::document::demo_document;
    use crate::llm::ScriptedLlmClient;

    fn fixture(mode: Mode) -> (VoiceState, NavigationContext) {
        let (_, chunks) = demo_document();
        let state = VoiceState::new("demo-doc", 1, 0, mode);
        let nav = build_navigation_context(&chunks, &state);
        (state, nav)
    }

    fn orchestrator_with(replies: Vec<&str>) -> Orchestrator {
        let llm = Arc::new(ScriptedLlmClient::new(replies));
        Orchestrator::new(Some(llm), &AppConfig::default())
    }

    #[tokio::test]
    async fn test_unconfigured_agent_gets_fixed_speech() {
        let orchestrator = Orchestrator::new(None, &AppConfig::default());
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("next please", &state, &nav).await;
        assert_eq!(action, VoiceAction::speech(AI_UNAVAILABLE_SPEECH));
    }

    #[tokio::test]
    async fn test_empty_transcript_short_circuits() {
        let orchestrator = orchestrator_with(vec![]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("   ", &state, &nav).await;
        assert_eq!(action.speech.as_deref(), Some(EMPTY_TRANSCRIPT_SPEECH));
    }

    #[tokio::test]
    async fn test_tool_call_dispatches_to_reading() {
        let orchestrator =
            orchestrator_with(vec![r#"{"tool": "reading_control", "args": {"command": "next"}}"#]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("keep going", &state, &nav).await;
        assert_eq!(action.action, Some(ActionKind::NextChunk));
        assert!(action.speech.is_none());
    }

    #[tokio::test]
    async fn test_free_text_reply_becomes_speech() {
        let orchestrator = orchestrator_with(vec!["You're doing great, keep at it!"]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("am i doing ok", &state, &nav).await;
        assert!(action.action.is_none());
        assert_eq!(action.speech.as_deref(), Some("You're doing great, keep at it!"));
    }

    #[tokio::test]
    async fn test_llm_failure_becomes_apology() {
        // 无脚本可弹 → LLM 层报错 → 边界收敛为道歉
        let orchestrator = orchestrator_with(vec![]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("next", &state, &nav).await;
        assert_eq!(action.speech.as_deref(), Some(GENERIC_FAILURE_SPEECH));
        assert!(action.action.is_none());
    }

    #[tokio::test]
    async fn test_hallucinated_tool_becomes_apology() {
        let orchestrator =
            orchestrator_with(vec![r#"{"tool": "teleport", "args": {"command": "up"}}"#]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("go up", &state, &nav).await;
        assert_eq!(action.speech.as_deref(), Some(GENERIC_FAILURE_SPEECH));
    }

    #[tokio::test]
    async fn test_malformed_tool_json_becomes_apology() {
        let orchestrator = orchestrator_with(vec![r#"{"tool": "reading_control", "#]);
        let (state, nav) = fixture(Mode::Reading);
        let action = orchestrator.orchestrate("next", &state, &nav).await;
        assert_eq!(action.speech.as_deref(), Some(GENERIC_FAILURE_SPEECH));
    }

    #[test]
    fn test_system_prompt_marks_current_mode() {
        let orchestrator = orchestrator_with(vec![]);
        let (state, nav) = fixture(Mode::Visual);
        let prompt = orchestrator.build_system_prompt(&state, &nav);
        assert!(prompt.contains("mode=VISUAL"));
        assert!(prompt.contains("visual_control: ") && prompt.contains("— CURRENT MODE"));
        assert!(prompt.contains("start_exploring"));
    }

    #[test]
    fn test_system_prompt_includes_formula_step_and_preview() {
        let orchestrator = orchestrator_with(vec![]);
        let (_, chunks) = demo_document();
        let state =
            VoiceState::new("demo-doc", 1, 1, Mode::Formula).with_formula_step("symbols");
        let nav = build_navigation_context(&chunks, &state);
        let prompt = orchestrator.build_system_prompt(&state, &nav);
        assert!(prompt.contains("Formula step: symbols"));
        assert!(prompt.contains("Current text: \"Gradient descent"));
    }
}
