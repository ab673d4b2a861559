//! 阅读模式处理器：朗读流程的导航命令
//!
//! dispatch 是 (command, state, nav) 的纯函数，对任意输入都返回确定的 VoiceAction。
//! next 带文档末尾守卫；back 无下界守卫，下界收敛由客户端负责；help 跨模式生效，
//! 内容始终反映当前模式的词汇表。

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{
    ActionKind, Mode, NavigationContext, RequestContext, VoiceAction, VoiceState,
};
use crate::tools::Tool;

/// 文档末尾时 next 的提示话术
const END_OF_DOCUMENT_SPEECH: &str =
    "You've reached the end of the document. Say End to finish, or Go back to review.";
/// end 命令的结束语
const END_LECTURE_SPEECH: &str = "That's the end of the lecture. Great work today!";

/// 当前模式的 help 菜单（help 可从任何模式触达，内容随模式变化）
pub fn help_speech(mode: Mode) -> &'static str {
    match mode {
        Mode::Reading => {
            "You can say: Continue, Go back, Where am I, Repeat, Summarize, or ask a question."
        }
        Mode::Formula => "You can say: Symbols, Example, Intuition, Continue to exit, or Go back.",
        Mode::Visual => {
            "You can say: Start exploring, What is here, Mark this, Guide me to, Next key point, or I'm done."
        }
    }
}

/// 阅读命令分发：纯函数，从不失败
pub fn dispatch(command: &str, state: &VoiceState, nav: &NavigationContext) -> VoiceAction {
    match command {
        "next" => {
            // 末尾守卫：最后一页最后一段时不再前进
            if nav.is_last_page && nav.is_last_chunk {
                VoiceAction::speech(END_OF_DOCUMENT_SPEECH)
            } else {
                VoiceAction::action(ActionKind::NextChunk)
            }
        }
        "back" => VoiceAction::action(ActionKind::PrevChunk),
        "where_am_i" => {
            let mut speech = format!(
                "You are on page {} of {}, chunk {} of {}.",
                state.page_no,
                nav.total_pages,
                state.chunk_index + 1,
                nav.total_chunks
            );
            if nav.is_last_page {
                speech.push_str(" This is the last page.");
            }
            if nav.is_last_chunk {
                speech.push_str(" This is the last chunk on this page.");
            }
            VoiceAction::speech(speech)
        }
        "repeat" => {
            if nav.chunk_text.is_empty() {
                VoiceAction::speech("Nothing to repeat.")
            } else {
                VoiceAction::speech(nav.chunk_text.clone())
            }
        }
        "help" => VoiceAction::speech(help_speech(state.mode)),
        "stop" => VoiceAction::silent(),
        "summarize" => VoiceAction::action(ActionKind::Summarize),
        "end" => VoiceAction::action(ActionKind::EndLecture).with_speech(END_LECTURE_SPEECH),
        _ => VoiceAction::speech("I didn't understand that reading command."),
    }
}

/// reading_control 工具：从 args 取 command 后委托给纯函数 dispatch
pub struct ReadingTool;

#[async_trait]
impl Tool for ReadingTool {
    fn name(&self) -> &str {
        "reading_control"
    }

    fn description(&self) -> &str {
        "Control the reading flow. Commands: next, back, where_am_i, repeat, help, stop, summarize, end. \
         Args: {\"command\": \"next\"}"
    }

    async fn execute(&self, args: Value, ctx: &RequestContext<'_>) -> Result<VoiceAction, String> {
        let command = args.get("command").and_then(|v| v.as_str()).unwrap_or("");
        Ok(dispatch(command, ctx.state, ctx.nav))
    }
}
