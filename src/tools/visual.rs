//! 视觉模式处理器：图表探索命令
//!
//! action 驱动应用级导航，special 驱动探索组件的局部行为，二者正交可同时出现；
//! guide_to 携带自由文本目标作为 payload。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::{ActionKind, RequestContext, SpecialSignal, VoiceAction};
use crate::tools::Tool;

/// start_exploring 的引导语
const START_EXPLORING_SPEECH: &str =
    "Exploration started. Move your pointer to explore. Say What is here, Mark this, or I'm done.";

/// 视觉命令分发：纯函数，从不失败
pub fn dispatch(command: &str, target: &str) -> VoiceAction {
    match command {
        "start_exploring" => VoiceAction::action(ActionKind::EnterExplore)
            .with_special(SpecialSignal::StartExploring)
            .with_speech(START_EXPLORING_SPEECH),
        "what_is_here" => VoiceAction::silent().with_special(SpecialSignal::WhatIsHere),
        "describe" => VoiceAction::silent().with_special(SpecialSignal::Describe),
        "mark" => VoiceAction::action(ActionKind::MarkPoint).with_special(SpecialSignal::MarkThis),
        "guide_to" => VoiceAction::action(ActionKind::StartGuidance)
            .with_special(SpecialSignal::GuideTo)
            .with_payload(json!(target)),
        "next_key_point" => VoiceAction::silent().with_special(SpecialSignal::NextKeyPoint),
        "done" => VoiceAction::silent().with_special(SpecialSignal::ImDone),
        "quick_exit" => VoiceAction::silent().with_special(SpecialSignal::QuickExitVisual),
        _ => VoiceAction::speech("You can say: What is here, Mark this, Guide me to, or I'm done."),
    }
}

/// visual_control 工具
pub struct VisualTool;

#[async_trait]
impl Tool for VisualTool {
    fn name(&self) -> &str {
        "visual_control"
    }

    fn description(&self) -> &str {
        "Control the visual explorer mode. Commands: start_exploring, what_is_here, describe, mark, \
         guide_to (provide target), next_key_point, done, quick_exit. \
         Args: {\"command\": \"guide_to\", \"target\": \"the highest peak\"}"
    }

    async fn execute(&self, args: Value, _ctx: &RequestContext<'_>) -> Result<VoiceAction, String> {
        let command = args.get("command").and_then(|v| v.as_str()).unwrap_or("");
        let target = args.get("target").and_then(|v| v.as_str()).unwrap_or("");
        Ok(dispatch(command, target))
    }
}
