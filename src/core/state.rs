//! 语音状态：客户端随请求上送的导航位置与交互模式
//!
//! 服务端不持久化也不修改 VoiceState，客户端是唯一事实来源；
//! 模式切换通过返回的 SET_MODE 指令由客户端自行应用。

use serde::{Deserialize, Serialize};

/// 交互模式：决定当前生效的命令词汇表与处理器
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Reading,
    Formula,
    Visual,
}

impl Mode {
    /// 提示词中的模式名（与线上格式一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Reading => "READING",
            Mode::Formula => "FORMULA",
            Mode::Visual => "VISUAL",
        }
    }
}

/// 客户端上送的请求级状态（字段名与前端 JSON 对齐）
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceState {
    pub doc_id: String,
    /// 页码，1 起
    pub page_no: u32,
    /// 当前页内 chunk 下标，0 起
    pub chunk_index: usize,
    pub mode: Mode,
    /// 仅在公式讲解进行中出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_step: Option<String>,
}

impl VoiceState {
    pub fn new(doc_id: impl Into<String>, page_no: u32, chunk_index: usize, mode: Mode) -> Self {
        Self {
            doc_id: doc_id.into(),
            page_no,
            chunk_index,
            mode,
            formula_step: None,
        }
    }

    pub fn with_formula_step(mut self, step: impl Into<String>) -> Self {
        self.formula_step = Some(step.into());
        self
    }
}
