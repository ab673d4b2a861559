//! 文档层：chunk 实体与只读文档存储
//!
//! Chunk 是段落/标题级的文本单元，也是引用（citation）的最小粒度；
//! 编排层只读取 chunk 列表，摄取（PDF 解析、模块抽取）由独立管线负责。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// chunk 类型（标题 / 段落 / 列表 / 图注）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Heading,
    Paragraph,
    Bullets,
    Caption,
}

/// 文档文本块（字段名与前端 JSON 对齐）
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub chunk_id: String,
    pub page_no: u32,
    /// 页内顺序
    pub order: u32,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub text: String,
}

impl Chunk {
    pub fn new(
        chunk_id: impl Into<String>,
        page_no: u32,
        order: u32,
        kind: ChunkKind,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            page_no,
            order,
            kind,
            text: text.into(),
        }
    }
}

/// 只读文档存储：按 doc_id 取全量 chunk（未知文档返回空）
pub trait DocumentStore: Send + Sync {
    fn chunks(&self, doc_id: &str) -> Vec<Chunk>;
}

/// 内存文档存储：进程内按 doc_id 保存 chunk 列表
#[derive(Default)]
pub struct InMemoryDocumentStore {
    docs: HashMap<String, Vec<Chunk>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc_id: impl Into<String>, chunks: Vec<Chunk>) {
        self.docs.insert(doc_id.into(), chunks);
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn chunks(&self, doc_id: &str) -> Vec<Chunk> {
        self.docs.get(doc_id).cloned().unwrap_or_default()
    }
}

/// 内置演示文档（机器学习入门讲义节选），让二进制无需摄取管线即可端到端运行
pub fn demo_document() -> (String, Vec<Chunk>) {
    let doc_id = "demo-doc".to_string();
    let chunks = vec![
        Chunk::new(
            "p1-c1",
            1,
            0,
            ChunkKind::Heading,
            "Chapter 3: Optimization for Machine Learning",
        ),
        Chunk::new(
            "p1-c2",
            1,
            1,
            ChunkKind::Paragraph,
            "Gradient descent is an iterative optimization algorithm. At each step it \
             moves the parameters in the direction of steepest descent of the loss \
             function, scaled by the learning rate.",
        ),
        Chunk::new(
            "p1-c3",
            1,
            2,
            ChunkKind::Paragraph,
            "The learning rate controls the step size. A rate that is too large can \
             overshoot the minimum, while a rate that is too small makes training slow.",
        ),
        Chunk::new(
            "p2-c1",
            2,
            0,
            ChunkKind::Heading,
            "The Update Rule",
        ),
        Chunk::new(
            "p2-c2",
            2,
            1,
            ChunkKind::Paragraph,
            "The update rule subtracts the gradient of the loss with respect to each \
             parameter, multiplied by the learning rate, from the current parameter value.",
        ),
        Chunk::new(
            "p2-c3",
            2,
            2,
            ChunkKind::Bullets,
            "Key terms: parameter, gradient, learning rate, convergence.",
        ),
        Chunk::new(
            "p3-c1",
            3,
            0,
            ChunkKind::Paragraph,
            "Training loss typically falls quickly during early epochs and then \
             flattens out as the model approaches convergence.",
        ),
        Chunk::new(
            "p3-c2",
            3,
            1,
            ChunkKind::Caption,
            "Figure 3.1: Training loss versus epochs for three learning rates.",
        ),
    ];
    (doc_id, chunks)
}
