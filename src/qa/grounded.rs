//! AI 接地问答：带引用校验的 LLM 回答
//!
//! 将候选 chunk 逐条编号进提示词，要求模型只引用给定 chunkId 并返回严格 JSON；
//! 解析后丢弃不在候选集中的引用（幻觉引用）；既无引用也无澄清问题的输出视为无效，
//! 返回错误交由级联降级。跟进问题可在提示词前拼接最近的问答历史。

use std::sync::Arc;

use serde::Deserialize;

use crate::core::TutorError;
use crate::document::Chunk;
use crate::llm::LlmClient;
use crate::memory::{ConversationEntry, Message};
use crate::qa::lexical::Citation;

/// 模型返回的接地回答（解析自严格 JSON）
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundedAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub clarifying_question: Option<String>,
}

/// 接地问答器：持有 LLM，回答前拼上下文，回答后做引用校验
pub struct GroundedQa {
    llm: Arc<dyn LlmClient>,
}

/// 去掉 markdown 代码围栏（模型常把 JSON 包进 ``` 中）
fn strip_code_fences(raw: &str) -> String {
    let cleaned = raw.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }
    cleaned
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

impl GroundedQa {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(question: &str, chunks: &[Chunk], history: &[ConversationEntry]) -> String {
        let context = chunks
            .iter()
            .map(|c| format!("[{}] (page {}): {}", c.chunk_id, c.page_no, c.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunk_ids = chunks.iter().map(|c| c.chunk_id.as_str()).collect::<Vec<_>>();

        let history_block = if history.is_empty() {
            String::new()
        } else {
            let turns = history
                .iter()
                .map(|e| format!("Q: {}\nA: {}", e.question, e.answer))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Previous conversation (for follow-up questions):\n{}\n\n", turns)
        };

        format!(
            r#"You are an accessibility-first tutor. Be concise, grounded in provided context, and never invent document content. If context is insufficient, say what's missing and ask one clarifying question.

Answer the question using ONLY the provided context. Return citations with the chunkIds used.

{history_block}Context:
{context}

Question: {question}

Rules:
- Cite specific chunk IDs in your answer
- If the context doesn't contain enough information, set clarifyingQuestion to ask for more detail
- Keep the answer concise (2-3 sentences for speaking aloud)
- Only reference chunkIds from this list: {chunk_ids:?}

Respond with ONLY valid JSON:
{{"answer": "your answer", "citations": [{{"chunkId": "id", "pageNo": 1}}], "clarifyingQuestion": null}}"#
        )
    }

    /// 生成接地回答；引用校验失败或输出无效时返回 Err，由上层降级
    pub async fn answer(
        &self,
        question: &str,
        chunks: &[Chunk],
        history: &[ConversationEntry],
    ) -> Result<GroundedAnswer, TutorError> {
        let prompt = Self::build_prompt(question, chunks, history);
        let raw = self
            .llm
            .complete(&[Message::user(prompt)])
            .await
            .map_err(TutorError::Llm)?;

        let cleaned = strip_code_fences(&raw);
        let mut parsed: GroundedAnswer = serde_json::from_str(&cleaned)
            .map_err(|e| TutorError::JsonParse(format!("{}: {}", e, cleaned)))?;

        // 幻觉引用：不在候选集中的 chunkId 一律丢弃
        let valid_ids: std::collections::HashSet<&str> =
            chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        parsed
            .citations
            .retain(|c| valid_ids.contains(c.chunk_id.as_str()));

        if parsed.citations.is_empty() && parsed.clarifying_question.is_none() {
            return Err(TutorError::InvalidAnswer(
                "no citations and no clarifying question".to_string(),
            ));
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkKind;
    use crate::llm::ScriptedLlmClient;

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("p1-c1", 1, 0, ChunkKind::Paragraph, "Gradient descent basics."),
            Chunk::new("p1-c2", 1, 1, ChunkKind::Paragraph, "Learning rate details."),
        ]
    }

    fn qa(reply: &str) -> GroundedQa {
        GroundedQa::new(Arc::new(ScriptedLlmClient::new([reply])))
    }

    #[tokio::test]
    async fn test_valid_answer_passes() {
        let reply = r#"{"answer": "It iterates downhill.", "citations": [{"chunkId": "p1-c1", "pageNo": 1}], "clarifyingQuestion": null}"#;
        let answer = qa(reply).answer("what is it", &chunks(), &[]).await.unwrap();
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.answer, "It iterates downhill.");
    }

    #[tokio::test]
    async fn test_hallucinated_citation_is_stripped() {
        let reply = r#"{"answer": "ok", "citations": [{"chunkId": "p9-c9", "pageNo": 9}, {"chunkId": "p1-c2", "pageNo": 1}], "clarifyingQuestion": null}"#;
        let answer = qa(reply).answer("q", &chunks(), &[]).await.unwrap();
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].chunk_id, "p1-c2");
    }

    #[tokio::test]
    async fn test_no_citations_no_clarifying_question_is_invalid() {
        let reply = r#"{"answer": "ungrounded claim", "citations": [], "clarifyingQuestion": null}"#;
        let err = qa(reply).answer("q", &chunks(), &[]).await.unwrap_err();
        assert!(matches!(err, TutorError::InvalidAnswer(_)));
    }

    #[tokio::test]
    async fn test_all_citations_hallucinated_is_invalid() {
        let reply = r#"{"answer": "ok", "citations": [{"chunkId": "zzz", "pageNo": 1}], "clarifyingQuestion": null}"#;
        let err = qa(reply).answer("q", &chunks(), &[]).await.unwrap_err();
        assert!(matches!(err, TutorError::InvalidAnswer(_)));
    }

    #[tokio::test]
    async fn test_clarifying_question_alone_is_valid() {
        let reply = r#"{"answer": "", "citations": [], "clarifyingQuestion": "Which page are you asking about?"}"#;
        let answer = qa(reply).answer("q", &chunks(), &[]).await.unwrap();
        assert_eq!(
            answer.clarifying_question.as_deref(),
            Some("Which page are you asking about?")
        );
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let reply = "```json\n{\"answer\": \"ok\", \"citations\": [{\"chunkId\": \"p1-c1\", \"pageNo\": 1}], \"clarifyingQuestion\": null}\n```";
        let answer = qa(reply).answer("q", &chunks(), &[]).await.unwrap();
        assert_eq!(answer.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let err = qa("not json at all").answer("q", &chunks(), &[]).await.unwrap_err();
        assert!(matches!(err, TutorError::JsonParse(_)));
    }

    #[test]
    fn test_history_is_embedded_in_prompt() {
        let history = vec![ConversationEntry {
            question: "earlier question".to_string(),
            answer: "earlier answer".to_string(),
            at: chrono::Utc::now(),
        }];
        let prompt = GroundedQa::build_prompt("follow-up", &chunks(), &history);
        assert!(prompt.contains("earlier question"));
        assert!(prompt.contains("Previous conversation"));
    }
}
