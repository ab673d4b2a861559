//! 公式模式处理器：讲解步骤选择与退出
//!
//! 四个讲解面（symbols / example / intuition / purpose）只产出步骤选择指令，
//! 具体讲解文本由独立的公式讲解能力在之后生成；continue 退回阅读模式并清空步骤。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::{ActionKind, RequestContext, VoiceAction};
use crate::tools::Tool;

/// continue 的告别语（同时也是模式切换的播报）
const EXIT_FORMULA_SPEECH: &str = "Returning to reading.";

/// 公式命令分发：纯函数，从不失败
pub fn dispatch(command: &str) -> VoiceAction {
    match command {
        "continue" => VoiceAction::action(ActionKind::SetMode)
            .with_payload(json!({"mode": "READING", "formulaStep": null}))
            .with_speech(EXIT_FORMULA_SPEECH),
        "symbols" => VoiceAction::action(ActionKind::FormulaSymbols),
        "example" => VoiceAction::action(ActionKind::FormulaExample),
        "intuition" => VoiceAction::action(ActionKind::FormulaIntuition),
        "purpose" => VoiceAction::action(ActionKind::FormulaPurpose),
        _ => VoiceAction::speech("You can say: Symbols, Example, Intuition, Purpose, or Continue."),
    }
}

/// formula_control 工具
pub struct FormulaTool;

#[async_trait]
impl Tool for FormulaTool {
    fn name(&self) -> &str {
        "formula_control"
    }

    fn description(&self) -> &str {
        "Control the formula tutor mode. Commands: symbols, example, intuition, purpose, continue (exit to reading). \
         Args: {\"command\": \"symbols\"}"
    }

    async fn execute(&self, args: Value, _ctx: &RequestContext<'_>) -> Result<VoiceAction, String> {
        let command = args.get("command").and_then(|v| v.as_str()).unwrap_or("");
        Ok(dispatch(command))
    }
}
