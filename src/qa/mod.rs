//! 问答层：词面检索兜底、AI 接地回答与降级级联

pub mod cascade;
pub mod grounded;
pub mod lexical;

pub use cascade::{AnswerStrategy, GroundedStrategy, LexicalStrategy, QaCascade, QaContext};
pub use grounded::{GroundedAnswer, GroundedQa};
pub use lexical::{answer_question, retrieve_top_chunks, Citation, QaReply, NO_CONTEXT_ANSWER};
