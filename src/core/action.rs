//! 动作 Schema：编排结果的统一出口
//!
//! 每次编排恰好产生一个 VoiceAction，由前端负责执行：action 驱动全局导航与模式切换，
//! special 驱动视觉探索组件的局部行为，二者正交、可同时非空；speech 为待朗读文本，
//! None 表示前端自行决定播报内容（如朗读新到达的 chunk）。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 全局导航 / 模式切换指令（与前端约定的 SCREAMING_SNAKE_CASE 线上格式一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    NextChunk,
    PrevChunk,
    EnterQa,
    EnterExplore,
    SetMode,
    EndLecture,
    Summarize,
    MarkPoint,
    StartGuidance,
    FormulaSymbols,
    FormulaExample,
    FormulaIntuition,
    FormulaPurpose,
}

/// 视觉探索组件的细粒度信号，独立于 ActionKind 的第二通道
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialSignal {
    StartExploring,
    WhatIsHere,
    Describe,
    MarkThis,
    GuideTo,
    NextKeyPoint,
    ImDone,
    QuickExitVisual,
}

/// 编排结果：action / speech / special / payload 四通道，全部可空
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceAction {
    pub action: Option<ActionKind>,
    pub speech: Option<String>,
    pub special: Option<SpecialSignal>,
    pub payload: Option<Value>,
}

impl VoiceAction {
    /// 仅含导航指令，speech 留空（由前端朗读新内容）
    pub fn action(kind: ActionKind) -> Self {
        Self {
            action: Some(kind),
            ..Self::default()
        }
    }

    /// 仅含朗读文本
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            ..Self::default()
        }
    }

    /// 四通道全空：用于 stop（静音由前端执行）
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_speech(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    pub fn with_special(mut self, special: SpecialSignal) -> Self {
        self.special = Some(special);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_wire_format() {
        let json = serde_json::to_string(&ActionKind::NextChunk).unwrap();
        assert_eq!(json, "\"NEXT_CHUNK\"");
        let json = serde_json::to_string(&ActionKind::FormulaSymbols).unwrap();
        assert_eq!(json, "\"FORMULA_SYMBOLS\"");
    }

    #[test]
    fn test_special_wire_format() {
        let json = serde_json::to_string(&SpecialSignal::QuickExitVisual).unwrap();
        assert_eq!(json, "\"QUICK_EXIT_VISUAL\"");
        let json = serde_json::to_string(&SpecialSignal::ImDone).unwrap();
        assert_eq!(json, "\"IM_DONE\"");
    }

    #[test]
    fn test_builders() {
        let a = VoiceAction::action(ActionKind::StartGuidance)
            .with_special(SpecialSignal::GuideTo)
            .with_payload(serde_json::json!("peak"));
        assert_eq!(a.action, Some(ActionKind::StartGuidance));
        assert_eq!(a.special, Some(SpecialSignal::GuideTo));
        assert_eq!(a.payload, Some(serde_json::json!("peak")));
        assert!(a.speech.is_none());
    }

    #[test]
    fn test_silent_is_all_none() {
        let a = VoiceAction::silent();
        assert!(a.action.is_none() && a.speech.is_none() && a.special.is_none() && a.payload.is_none());
    }
}
