//! 语音转写：SpeechToText 抽象与 Deepgram 实现
//!
//! 编排核心把转写当黑盒消费（transcript 由调用方传入）；这里提供生产实现：
//! Deepgram 预录音 REST 接口（nova-2），失败时返回 Transcription 错误由调用方处理。

use async_trait::async_trait;
use reqwest::Client;

use crate::config::SpeechSection;
use crate::core::TutorError;

const DEEPGRAM_LISTEN_URL: &str = "https://api.deepgram.com/v1/listen";
/// 转写请求超时（秒）
const TRANSCRIBE_TIMEOUT_SECS: u64 = 30;

/// 语音转写抽象：音频字节 + MIME 类型 → 转写文本
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, TutorError>;
}

/// Deepgram 转写客户端
pub struct DeepgramTranscriber {
    client: Client,
    api_key: String,
    model: String,
    language: String,
}

impl DeepgramTranscriber {
    /// 从环境变量 DEEPGRAM_API_KEY 创建；未设置时返回 None（转写不可用，非错误）
    pub fn from_env(cfg: &SpeechSection) -> Option<Self> {
        let api_key = std::env::var("DEEPGRAM_API_KEY").ok()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(TRANSCRIBE_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Some(Self {
            client,
            api_key,
            model: cfg.model.clone(),
            language: cfg.language.clone(),
        })
    }
}

#[async_trait]
impl SpeechToText for DeepgramTranscriber {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, TutorError> {
        let response = self
            .client
            .post(DEEPGRAM_LISTEN_URL)
            .query(&[
                ("model", self.model.as_str()),
                ("smart_format", "true"),
                ("language", self.language.as_str()),
            ])
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", mime_type)
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| TutorError::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TutorError::Transcription(format!(
                "Deepgram returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TutorError::Transcription(e.to_string()))?;

        let transcript = body
            .pointer("/results/channels/0/alternatives/0/transcript")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        tracing::info!(transcript = %transcript, "Deepgram transcript");
        Ok(transcript)
    }
}
