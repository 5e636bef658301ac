// 划词助手核心库 - 双击触发、选区捕获与 LLM 查询编排
//
// 外壳层（窗口、系统按键钩子、辅助功能绑定、托盘）通过本库暴露的
// 接口接入: OverlaySurface / AccessibilityBridge / CredentialStore

// 声明模块
pub mod actors;
pub mod credentials;
pub mod event_bus;
pub mod gesture;
pub mod llm;
pub mod logger;
pub mod models;
pub mod overlay;
pub mod selection;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use actors::{AssistantActor, AssistantHandle};
use credentials::KeychainStore;
use event_bus::EventBus;
use llm::OpenAiClient;
use overlay::OverlaySurface;
use selection::{AccessibilityBridge, SelectionCapture};
use settings::SettingsManager;

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    if cfg!(target_os = "macos") {
        PathBuf::from(home).join("Library/Application Support/selection-assistant/config.json")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("selection-assistant").join("config.json")
    } else {
        PathBuf::from(home).join(".config/selection-assistant/config.json")
    }
}

/// 组装并启动助手核心
///
/// 外壳层注入实际的浮窗窗口与辅助功能桥;凭据默认走系统钥匙串。
/// 返回 Handle（按键生产者与命令入口）和事件总线（状态观察）
pub async fn spawn_assistant(
    surface: Box<dyn OverlaySurface>,
    bridge: Arc<dyn AccessibilityBridge>,
) -> Result<(AssistantHandle, Arc<EventBus>)> {
    let settings = Arc::new(SettingsManager::new(default_config_path()).await?);
    let config = settings.get().await;

    let event_bus = Arc::new(EventBus::new(200));
    let credentials = Arc::new(KeychainStore::new());
    let completion = Arc::new(OpenAiClient::new(
        reqwest::Client::new(),
        Arc::clone(&settings),
        credentials,
    ));
    let capture = SelectionCapture::with_default_chain(bridge);

    let (actor, handle) = AssistantActor::new(
        &config,
        capture,
        surface,
        completion,
        settings,
        Arc::clone(&event_bus),
    );
    tokio::spawn(async move {
        actor.run().await;
    });

    info!(
        "助手核心已启动: 触发键 {:?}, 双击窗口 {}ms",
        config.gesture.trigger_key, config.gesture.debounce_window_ms
    );
    Ok((handle, event_bus))
}
