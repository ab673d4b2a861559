//! 词面检索引擎：关键词重合度打分的最后兜底
//!
//! 小写空白切词取词集，得分 = 问题词集与 chunk 词集交集大小（词袋，不做短语匹配）。
//! 优先限定当前页；若页内最高分为 0 则改在全文重新打分（局部性只有在有信息量时才优先）。
//! 零分 chunk 全部丢弃。无网络、无状态、对任意输入都不失败。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::Chunk;

/// 没有任何词面命中时的固定回答
pub const NO_CONTEXT_ANSWER: &str =
    "I don't have enough context to answer that. Try rephrasing, or say Continue to go back.";

/// 组合回答默认取前 2 个 chunk
const ANSWER_TOP_N: usize = 2;

/// 引用：回答所依据的 chunk（字段名与前端 JSON 对齐）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub page_no: u32,
    pub chunk_id: String,
}

/// 问答结果：回答文本与结构化引用
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QaReply {
    pub answer: String,
    pub citations: Vec<Citation>,
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(String::from).collect()
}

fn score_chunk(chunk: &Chunk, question_tokens: &HashSet<String>) -> usize {
    let chunk_tokens = tokenize(&chunk.text);
    question_tokens.intersection(&chunk_tokens).count()
}

/// 检索与问题词面最相关的 chunk，按得分降序（稳定），长度 ≤ top_n
pub fn retrieve_top_chunks<'a>(
    question: &str,
    chunks: &'a [Chunk],
    page_no: Option<u32>,
    top_n: usize,
) -> Vec<&'a Chunk> {
    let question_tokens = tokenize(question);

    let page_chunks: Vec<&Chunk> = match page_no {
        Some(p) => chunks.iter().filter(|c| c.page_no == p).collect(),
        None => Vec::new(),
    };

    let candidates: Vec<&Chunk> = if page_chunks.is_empty() {
        chunks.iter().collect()
    } else {
        page_chunks.clone()
    };

    let mut scored: Vec<(&Chunk, usize)> = candidates
        .into_iter()
        .map(|c| (c, score_chunk(c, &question_tokens)))
        .collect();
    scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));

    // 页内最高分为 0 时放弃局部性，在全文重新打分
    if scored.first().map(|&(_, s)| s == 0).unwrap_or(false) && !page_chunks.is_empty() {
        scored = chunks
            .iter()
            .map(|c| (c, score_chunk(c, &question_tokens)))
            .collect();
        scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
    }

    scored
        .into_iter()
        .filter(|&(_, score)| score > 0)
        .take(top_n)
        .map(|(c, _)| c)
        .collect()
}

/// 词面问答：取前 2 个相关 chunk 组合回答并附引用；无命中则返回固定话术且无引用
pub fn answer_question(question: &str, chunks: &[Chunk], page_no: Option<u32>) -> QaReply {
    let top = retrieve_top_chunks(question, chunks, page_no, ANSWER_TOP_N);

    if top.is_empty() {
        return QaReply {
            answer: NO_CONTEXT_ANSWER.to_string(),
            citations: Vec::new(),
        };
    }

    let citations: Vec<Citation> = top
        .iter()
        .map(|c| Citation {
            page_no: c.page_no,
            chunk_id: c.chunk_id.clone(),
        })
        .collect();

    let citation_labels = citations
        .iter()
        .map(|c| c.chunk_id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let answer_text = top.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");

    QaReply {
        answer: format!("Based on {}: {}", citation_labels, answer_text),
        citations,
    }
}
