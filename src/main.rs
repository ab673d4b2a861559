//! Lumen - 面向视障学生的语音朗读助教
//!
//! 演示入口：加载内置演示文档，从标准输入逐行读取「转写文本」（代替语音链路），
//! 跑编排器并打印动作 JSON，同时像真实客户端一样应用导航指令。
//! 传入音频文件路径参数时改走真实转写链路（需 DEEPGRAM_API_KEY），转写后编排一次。

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lumen::config::load_config;
use lumen::core::{build_navigation_context, ActionKind, Orchestrator};
use lumen::document::{demo_document, DocumentStore, InMemoryDocumentStore};
use lumen::speech::{DeepgramTranscriber, SpeechToText};
use lumen::{Mode, VoiceState};

/// 由扩展名猜 MIME 类型（Deepgram 需要 Content-Type）
fn guess_mime_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        _ => "audio/webm",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config().unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        Default::default()
    });

    let mut store = InMemoryDocumentStore::new();
    let (doc_id, chunks) = demo_document();
    store.insert(doc_id.clone(), chunks);

    let orchestrator = Orchestrator::from_config(&cfg);
    let mut state = VoiceState::new(doc_id, 1, 0, Mode::Reading);

    // 音频文件模式：转写一次并编排一次
    if let Some(audio_path) = std::env::args().nth(1) {
        let transcriber = DeepgramTranscriber::from_env(&cfg.speech)
            .context("DEEPGRAM_API_KEY not set, cannot transcribe audio")?;
        let audio = std::fs::read(&audio_path)
            .with_context(|| format!("Failed to read audio file {audio_path}"))?;
        let transcript = transcriber
            .transcribe(&audio, guess_mime_type(&audio_path))
            .await?;
        println!("Transcript: {transcript}");

        let chunks = store.chunks(&state.doc_id);
        let nav = build_navigation_context(&chunks, &state);
        let action = orchestrator.orchestrate(&transcript, &state, &nav).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&action).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    println!("Lumen demo. Type a voice command (\"quit\" to exit):");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line).context("stdin read failed")? == 0 {
            break;
        }
        let transcript = line.trim();
        if transcript.eq_ignore_ascii_case("quit") {
            break;
        }

        let chunks = store.chunks(&state.doc_id);
        let nav = build_navigation_context(&chunks, &state);
        let action = orchestrator.orchestrate(transcript, &state, &nav).await;

        println!(
            "{}",
            serde_json::to_string_pretty(&action).unwrap_or_else(|_| "{}".to_string())
        );

        // 像客户端一样应用导航指令（演示用的朴素实现）
        match action.action {
            Some(ActionKind::NextChunk) => {
                if state.chunk_index + 1 < nav.total_chunks {
                    state.chunk_index += 1;
                } else if !nav.is_last_page {
                    state.page_no += 1;
                    state.chunk_index = 0;
                }
            }
            Some(ActionKind::PrevChunk) => {
                state.chunk_index = state.chunk_index.saturating_sub(1);
            }
            Some(ActionKind::SetMode) => {
                if let Some(mode) = action
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("mode"))
                    .and_then(|m| serde_json::from_value::<Mode>(m.clone()).ok())
                {
                    state.mode = mode;
                    state.formula_step = None;
                }
            }
            Some(ActionKind::EndLecture) => break,
            _ => {}
        }
    }

    let (prompt_tokens, completion_tokens, total) = orchestrator.token_usage();
    tracing::info!(prompt_tokens, completion_tokens, total, "Token usage");

    Ok(())
}
