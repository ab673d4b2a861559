//! 记忆层：LLM 消息类型与按文档键控的有界问答历史

pub mod conversation;

pub use conversation::{
    ConversationEntry, ConversationMemory, Message, Role, MAX_HISTORY_PER_DOC,
};
