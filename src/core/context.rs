//! 导航上下文：每次请求前由原始 chunk 列表推导的位置事实
//!
//! 纯函数，无副作用；所有处理器都依赖它，因此必须在每次编排调用前重建。
//! 越界不报错：chunk_index 超出当前页时 chunk_text 为空；page_no 不在页集合中时按第 0 页处理。

use serde::Serialize;

use crate::core::VoiceState;
use crate::document::Chunk;

/// 当前页为空时，nearby_chunks 回退取全文前若干个 chunk
const NEARBY_FALLBACK_CHUNKS: usize = 5;

/// 请求级只读位置事实，供处理器与系统提示词使用
#[derive(Clone, Debug, Default, Serialize)]
pub struct NavigationContext {
    /// 当前 chunk 文本，越界时为空
    pub chunk_text: String,
    /// 当前页 chunk 数
    pub total_chunks: usize,
    pub total_pages: usize,
    pub pages_remaining: usize,
    pub chunks_remaining: usize,
    pub is_last_page: bool,
    pub is_last_chunk: bool,
    /// 问答候选：当前页的 chunk；页为空则取全文前 5 个
    pub nearby_chunks: Vec<Chunk>,
}

/// 请求级上下文：线程式地传入每个工具调用，取代进程级共享变量
pub struct RequestContext<'a> {
    pub state: &'a VoiceState,
    pub nav: &'a NavigationContext,
}

/// 由文档全量 chunk 与客户端状态推导 NavigationContext
pub fn build_navigation_context(chunks: &[Chunk], state: &VoiceState) -> NavigationContext {
    let mut page_chunks: Vec<Chunk> = chunks
        .iter()
        .filter(|c| c.page_no == state.page_no)
        .cloned()
        .collect();
    page_chunks.sort_by_key(|c| c.order);

    let chunk_text = page_chunks
        .get(state.chunk_index)
        .map(|c| c.text.clone())
        .unwrap_or_default();

    let mut all_pages: Vec<u32> = chunks.iter().map(|c| c.page_no).collect();
    all_pages.sort_unstable();
    all_pages.dedup();

    let total_pages = all_pages.len();
    let current_page_idx = all_pages
        .iter()
        .position(|&p| p == state.page_no)
        .unwrap_or(0);
    let pages_remaining = total_pages.saturating_sub(current_page_idx + 1);
    let chunks_remaining = page_chunks.len().saturating_sub(state.chunk_index + 1);

    let nearby_chunks = if page_chunks.is_empty() {
        chunks.iter().take(NEARBY_FALLBACK_CHUNKS).cloned().collect()
    } else {
        page_chunks.clone()
    };

    NavigationContext {
        chunk_text,
        total_chunks: page_chunks.len(),
        total_pages,
        pages_remaining,
        chunks_remaining,
        is_last_page: pages_remaining == 0,
        is_last_chunk: chunks_remaining == 0,
        nearby_chunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Mode;
    use crate::document::demo_document;

    fn state(page_no: u32, chunk_index: usize) -> VoiceState {
        VoiceState::new("demo-doc", page_no, chunk_index, Mode::Reading)
    }

    #[test]
    fn test_position_facts_on_first_page() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(1, 0));
        assert_eq!(nav.total_pages, 3);
        assert_eq!(nav.total_chunks, 3);
        assert_eq!(nav.pages_remaining, 2);
        assert_eq!(nav.chunks_remaining, 2);
        assert!(!nav.is_last_page);
        assert!(!nav.is_last_chunk);
        assert!(nav.chunk_text.contains("Chapter 3"));
    }

    #[test]
    fn test_last_page_last_chunk() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(3, 1));
        assert!(nav.is_last_page);
        assert!(nav.is_last_chunk);
        assert_eq!(nav.pages_remaining, 0);
        assert_eq!(nav.chunks_remaining, 0);
    }

    #[test]
    fn test_out_of_range_chunk_index_yields_empty_text() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(1, 99));
        assert_eq!(nav.chunk_text, "");
        assert_eq!(nav.chunks_remaining, 0);
        assert!(nav.is_last_chunk);
    }

    #[test]
    fn test_unknown_page_defaults_to_index_zero() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(42, 0));
        // 页 42 不存在：当前页按第 0 页计，页内为空
        assert_eq!(nav.total_chunks, 0);
        assert_eq!(nav.pages_remaining, 2);
        assert_eq!(nav.chunk_text, "");
    }

    #[test]
    fn test_nearby_falls_back_to_document_head_when_page_empty() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(42, 0));
        assert_eq!(nav.nearby_chunks.len(), 5);
        assert_eq!(nav.nearby_chunks[0].chunk_id, "p1-c1");
    }

    #[test]
    fn test_nearby_is_current_page_when_present() {
        let (_, chunks) = demo_document();
        let nav = build_navigation_context(&chunks, &state(2, 0));
        assert_eq!(nav.nearby_chunks.len(), 3);
        assert!(nav.nearby_chunks.iter().all(|c| c.page_no == 2));
    }

    #[test]
    fn test_empty_document() {
        let nav = build_navigation_context(&[], &state(1, 0));
        assert_eq!(nav.total_pages, 0);
        assert_eq!(nav.total_chunks, 0);
        assert_eq!(nav.chunk_text, "");
        assert!(nav.nearby_chunks.is_empty());
    }

    #[test]
    fn test_page_chunks_sorted_by_order() {
        let chunks = vec![
            Chunk::new("c-b", 1, 1, crate::document::ChunkKind::Paragraph, "second"),
            Chunk::new("c-a", 1, 0, crate::document::ChunkKind::Paragraph, "first"),
        ];
        let nav = build_navigation_context(&chunks, &state(1, 0));
        assert_eq!(nav.chunk_text, "first");
    }
}
