//! ask_question 工具：带降级级联的文档问答
//!
//! 自带内层级联（AI 接地 → 词面检索），任一层的结果先写入会话记忆，
//! 再包装为 ENTER_QA 指令返回；问答失败不会中断编排的其余部分。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{ActionKind, RequestContext, VoiceAction};
use crate::memory::ConversationMemory;
use crate::qa::{QaCascade, QaContext};
use crate::tools::Tool;

/// ask_question 工具：级联问答 + 会话记忆
pub struct AskTool {
    cascade: QaCascade,
    memory: Arc<ConversationMemory>,
    /// 向 AI 路径拼接的历史条数
    history_limit: usize,
}

impl AskTool {
    pub fn new(cascade: QaCascade, memory: Arc<ConversationMemory>, history_limit: usize) -> Self {
        Self {
            cascade,
            memory,
            history_limit,
        }
    }
}

#[async_trait]
impl Tool for AskTool {
    fn name(&self) -> &str {
        "ask_question"
    }

    fn description(&self) -> &str {
        "Answer a question about the document content using the provided context chunks. \
         Args: {\"question\": \"what is gradient descent\"}"
    }

    async fn execute(&self, args: Value, ctx: &RequestContext<'_>) -> Result<VoiceAction, String> {
        let question = args.get("question").and_then(|v| v.as_str()).unwrap_or("");

        let qa_ctx = QaContext {
            doc_id: &ctx.state.doc_id,
            page_no: ctx.state.page_no,
            chunks: &ctx.nav.nearby_chunks,
            history: self.memory.recent(&ctx.state.doc_id, self.history_limit),
        };
        let reply = self.cascade.answer(question, &qa_ctx).await;

        self.memory.record(&ctx.state.doc_id, question, &reply.answer);

        Ok(VoiceAction::action(ActionKind::EnterQa).with_speech(reply.answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_navigation_context, Mode, VoiceState};
    use crate::document::demo_document;
    use crate::llm::ScriptedLlmClient;
    use crate::qa::{GroundedQa, GroundedStrategy, LexicalStrategy};

    fn lexical_only_tool(memory: Arc<ConversationMemory>) -> AskTool {
        AskTool::new(QaCascade::new(vec![Box::new(LexicalStrategy)]), memory, 3)
    }

    #[tokio::test]
    async fn test_answer_is_wrapped_in_enter_qa() {
        let memory = Arc::new(ConversationMemory::new());
        let tool = lexical_only_tool(memory.clone());
        let (_, chunks) = demo_document();
        let state = VoiceState::new("demo-doc", 1, 0, Mode::Reading);
        let nav = build_navigation_context(&chunks, &state);
        let ctx = RequestContext {
            state: &state,
            nav: &nav,
        };

        let action = tool
            .execute(
                serde_json::json!({"question": "what is gradient descent"}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(action.action, Some(ActionKind::EnterQa));
        assert!(action.speech.as_deref().unwrap_or("").contains("p1-c2"));
    }

    #[tokio::test]
    async fn test_both_paths_record_into_memory() {
        let memory = Arc::new(ConversationMemory::new());
        let tool = lexical_only_tool(memory.clone());
        let (_, chunks) = demo_document();
        let state = VoiceState::new("demo-doc", 1, 0, Mode::Reading);
        let nav = build_navigation_context(&chunks, &state);
        let ctx = RequestContext {
            state: &state,
            nav: &nav,
        };

        tool.execute(serde_json::json!({"question": "learning rate"}), &ctx)
            .await
            .unwrap();
        assert_eq!(memory.len("demo-doc"), 1);
        assert_eq!(memory.recent("demo-doc", 1)[0].question, "learning rate");
    }

    #[tokio::test]
    async fn test_grounded_failure_falls_back_and_still_answers() {
        let memory = Arc::new(ConversationMemory::new());
        let llm = Arc::new(ScriptedLlmClient::new(["malformed output"]));
        let cascade = QaCascade::new(vec![
            Box::new(GroundedStrategy::new(GroundedQa::new(llm))),
            Box::new(LexicalStrategy),
        ]);
        let tool = AskTool::new(cascade, memory, 3);
        let (_, chunks) = demo_document();
        let state = VoiceState::new("demo-doc", 1, 0, Mode::Reading);
        let nav = build_navigation_context(&chunks, &state);
        let ctx = RequestContext {
            state: &state,
            nav: &nav,
        };

        let action = tool
            .execute(serde_json::json!({"question": "gradient descent"}), &ctx)
            .await
            .unwrap();
        assert_eq!(action.action, Some(ActionKind::EnterQa));
        assert!(action.speech.as_deref().unwrap_or("").starts_with("Based on"));
    }
}
