//! 会话记忆：按文档维度保存最近的问答对
//!
//! 仅问答路径写入；追加后立即裁剪到上限（淘汰最旧），对同一 doc_id 的
//! append+trim 在同一把锁内完成，并发请求可能丢失或乱序条目但结构不会损坏。
//! 进程生命周期缓存，不做持久化。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 每个文档保留的问答对上限，超出从队首淘汰
pub const MAX_HISTORY_PER_DOC: usize = 10;

/// 一次问答
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
    pub at: DateTime<Utc>,
}

/// 按 doc_id 键控的有界问答历史；首次提问时惰性创建，从不显式销毁
#[derive(Default)]
pub struct ConversationMemory {
    histories: Mutex<HashMap<String, VecDeque<ConversationEntry>>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条问答并裁剪到上限；对同一 key 原子
    pub fn record(&self, doc_id: &str, question: impl Into<String>, answer: impl Into<String>) {
        let entry = ConversationEntry {
            question: question.into(),
            answer: answer.into(),
            at: Utc::now(),
        };
        let mut histories = self
            .histories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let history = histories.entry(doc_id.to_string()).or_default();
        history.push_back(entry);
        while history.len() > MAX_HISTORY_PER_DOC {
            history.pop_front();
        }
    }

    /// 最近 limit 条的只读快照（最旧在前），用于向 AI 问答拼接上文
    pub fn recent(&self, doc_id: &str, limit: usize) -> Vec<ConversationEntry> {
        let histories = self
            .histories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        histories
            .get(doc_id)
            .map(|h| h.iter().rev().take(limit).rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, doc_id: &str) -> usize {
        let histories = self
            .histories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        histories.get(doc_id).map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, doc_id: &str) -> bool {
        self.len(doc_id) == 0
    }
}
