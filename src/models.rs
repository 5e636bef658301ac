// 数据模型 - 按键事件、选区与持久化配置

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// 被监听的修饰键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    Command,
    Option,
    Control,
    Shift,
    Function,
}

/// 按键事件来源
///
/// 进程内监视器和系统级监视器可能对同一次物理按键各上报一次,
/// 去重逻辑见 `gesture` 模块
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// 进程内事件监视器
    InProcess,
    /// 系统级事件监视器
    Global,
}

/// 按键边沿
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTransition {
    Press,
    Release,
}

/// 原始按键过渡事件（两个生产者投递给 Actor 的消息体）
#[derive(Clone, Copy, Debug)]
pub struct KeyEvent {
    pub key: ModifierKey,
    pub transition: KeyTransition,
    pub source: KeySource,
    pub at: Instant,
}

/// 双击手势触发事件
#[derive(Clone, Copy, Debug)]
pub struct Trigger {
    pub at: Instant,
}

/// 捕获到的选区文本（捕获后不可变，归当前请求周期所有）
#[derive(Clone, Debug)]
pub struct CapturedSelection {
    pub text: String,
    pub captured_at: DateTime<Utc>,
}

impl CapturedSelection {
    pub fn new(text: String) -> Self {
        Self {
            text,
            captured_at: Utc::now(),
        }
    }
}

// ==================== 持久化配置 ====================

/// LLM 请求配置（请求构建时读取）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmSettings {
    /// 模型标识
    #[serde(default = "default_model")]
    pub model: String,
    /// 系统角色提示词
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// 聊天补全接口地址
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            endpoint: default_endpoint(),
        }
    }
}

/// 手势配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GestureSettings {
    /// 触发键
    #[serde(default = "default_trigger_key")]
    pub trigger_key: ModifierKey,
    /// 双击判定窗口（毫秒）
    #[serde(default = "default_debounce_window_ms")]
    pub debounce_window_ms: u64,
}

fn default_trigger_key() -> ModifierKey {
    ModifierKey::Command
}

fn default_debounce_window_ms() -> u64 {
    300
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            trigger_key: default_trigger_key(),
            debounce_window_ms: default_debounce_window_ms(),
        }
    }
}

/// 浮窗配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// 结果文本换行的最大宽度（逻辑像素）
    #[serde(default = "default_max_text_width")]
    pub max_text_width: f64,
}

fn default_max_text_width() -> f64 {
    400.0
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            max_text_width: default_max_text_width(),
        }
    }
}

/// 持久化的应用配置
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub gesture: GestureSettings,
    #[serde(default)]
    pub overlay: OverlaySettings,
}

/// 配置的部分更新（None 字段保持不变）
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigUpdate {
    pub llm: Option<LlmSettings>,
    pub gesture: Option<GestureSettings>,
    pub overlay: Option<OverlaySettings>,
}
