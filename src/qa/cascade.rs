//! 问答降级级联：按序尝试的策略列表
//!
//! 降级策略是数据而非嵌套控制流：每个策略实现统一的 attempt 接口，按声明顺序
//! 逐个尝试，首个成功者胜出。词面检索排在末位且对任意输入不失败，因此整条
//! 级联对调用方是全函数。

use async_trait::async_trait;

use crate::core::TutorError;
use crate::document::Chunk;
use crate::memory::ConversationEntry;
use crate::qa::grounded::GroundedQa;
use crate::qa::lexical::{self, QaReply};

/// 一次问答的请求级输入
pub struct QaContext<'a> {
    pub doc_id: &'a str,
    pub page_no: u32,
    /// 检索候选（当前页 chunk，或文档头部回退）
    pub chunks: &'a [Chunk],
    /// 最近问答历史快照（仅 AI 路径使用，词面路径无状态）
    pub history: Vec<ConversationEntry>,
}

/// 问答策略：成功返回 QaReply，失败交给下一层
#[async_trait]
pub trait AnswerStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(&self, question: &str, ctx: &QaContext<'_>) -> Result<QaReply, TutorError>;
}

/// AI 接地策略：引用校验失败与上游错误均视为本层失败
pub struct GroundedStrategy {
    qa: GroundedQa,
}

impl GroundedStrategy {
    pub fn new(qa: GroundedQa) -> Self {
        Self { qa }
    }
}

#[async_trait]
impl AnswerStrategy for GroundedStrategy {
    fn name(&self) -> &str {
        "grounded"
    }

    async fn attempt(&self, question: &str, ctx: &QaContext<'_>) -> Result<QaReply, TutorError> {
        let answer = self.qa.answer(question, ctx.chunks, &ctx.history).await?;

        // 无引用（但有澄清问题）时播报澄清问题本身，避免朗读无依据的回答
        let speech = if answer.citations.is_empty() || answer.answer.trim().is_empty() {
            answer
                .clarifying_question
                .clone()
                .unwrap_or(answer.answer.clone())
        } else {
            answer.answer.clone()
        };

        Ok(QaReply {
            answer: speech,
            citations: answer.citations,
        })
    }
}

/// 词面检索策略：最后兜底，从不失败
pub struct LexicalStrategy;

#[async_trait]
impl AnswerStrategy for LexicalStrategy {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn attempt(&self, question: &str, ctx: &QaContext<'_>) -> Result<QaReply, TutorError> {
        Ok(lexical::answer_question(
            question,
            ctx.chunks,
            Some(ctx.page_no),
        ))
    }
}

/// 按序尝试策略直到成功
pub struct QaCascade {
    strategies: Vec<Box<dyn AnswerStrategy>>,
}

impl QaCascade {
    pub fn new(strategies: Vec<Box<dyn AnswerStrategy>>) -> Self {
        Self { strategies }
    }

    /// 逐层尝试；LexicalStrategy 兜底使得正常配置下必有结果
    pub async fn answer(&self, question: &str, ctx: &QaContext<'_>) -> QaReply {
        for strategy in &self.strategies {
            match strategy.attempt(question, ctx).await {
                Ok(reply) => {
                    tracing::info!(doc_id = ctx.doc_id, strategy = strategy.name(), "QA strategy succeeded");
                    return reply;
                }
                Err(e) => {
                    tracing::warn!(doc_id = ctx.doc_id, strategy = strategy.name(), error = %e, "QA strategy failed, trying next");
                }
            }
        }
        QaReply {
            answer: lexical::NO_CONTEXT_ANSWER.to_string(),
            citations: Vec::new(),
        }
    }
}
