// 配置管理 - JSON 文件持久化,读多写少故用 RwLock

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{AssistantConfig, ConfigUpdate};

/// 配置管理器
///
/// 首次运行时写出默认配置;文件损坏时回退默认值而不报错,
/// 下次保存会覆盖掉损坏内容
pub struct SettingsManager {
    path: PathBuf,
    current: RwLock<AssistantConfig>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("创建配置目录失败")?;
        }

        let current = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice::<AssistantConfig>(&bytes).unwrap_or_default()
            }
            _ => {
                let config = AssistantConfig::default();
                write_config(&path, &config).await?;
                info!("已写出默认配置: {:?}", path);
                config
            }
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub async fn get(&self) -> AssistantConfig {
        self.current.read().await.clone()
    }

    /// 应用部分更新并落盘,None 字段保持原值
    pub async fn update(&self, update: ConfigUpdate) -> Result<AssistantConfig> {
        let mut config = self.current.write().await;

        if let Some(llm) = update.llm {
            config.llm = llm;
        }
        if let Some(gesture) = update.gesture {
            config.gesture = gesture;
        }
        if let Some(overlay) = update.overlay {
            config.overlay = overlay;
        }

        write_config(&self.path, &config).await?;
        Ok(config.clone())
    }
}

async fn write_config(path: &Path, config: &AssistantConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, json)
        .await
        .context("写入配置文件失败")?;
    Ok(())
}
