//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `LUMEN__*` 覆盖（双下划线表示嵌套，
//! 如 `LUMEN__LLM__PROVIDER=openai`）。API Key 一律走环境变量，不进配置文件。

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub qa: QaSection,
    pub speech: SpeechSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：groq / openai；优先级由 API Key 与 provider 共同决定
    pub provider: String,
    /// 模型名；None 时用后端默认
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: None,
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）；超时按普通失败走降级
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 30 }
    }
}

/// [qa] 段：问答行为
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QaSection {
    /// 跟进问题向 AI 拼接的历史条数
    pub history_limit: usize,
}

impl Default for QaSection {
    fn default() -> Self {
        Self { history_limit: 3 }
    }
}

/// [speech] 段：语音转写
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechSection {
    pub model: String,
    pub language: String,
}

impl Default for SpeechSection {
    fn default() -> Self {
        Self {
            model: "nova-2".to_string(),
            language: "en".to_string(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 LUMEN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 最后叠加环境变量 LUMEN__*（双下划线表示嵌套键）
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LUMEN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
