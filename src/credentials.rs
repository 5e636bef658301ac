// 凭据存储 - 以固定 service+account 标识读写一条密钥
//
// 默认实现落在系统安全存储:
// - macOS: 钥匙串
// - Windows: 凭据管理器
// - Linux: Secret Service (libsecret)
// 核心逻辑只依赖 CredentialStore 接口,不关心存储机制

use anyhow::{Context, Result};
use keyring::Entry;
use std::sync::RwLock;
use tracing::info;

/// 钥匙串条目的固定标识
const SERVICE_NAME: &str = "com.selection-assistant.api";
const ACCOUNT_NAME: &str = "openai_api_key";

/// 密钥存取接口
pub trait CredentialStore: Send + Sync {
    /// 读取密钥,未存储过返回 Ok(None)
    fn get(&self) -> Result<Option<String>>;

    /// 写入密钥
    fn set(&self, secret: &str) -> Result<()>;

    /// 删除密钥（不存在时视为成功）
    fn delete(&self) -> Result<()>;
}

/// 系统钥匙串实现
pub struct KeychainStore;

impl KeychainStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, ACCOUNT_NAME).context("创建钥匙串条目失败")
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeychainStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("读取钥匙串失败"),
        }
    }

    fn set(&self, secret: &str) -> Result<()> {
        self.entry()?
            .set_password(secret)
            .context("写入钥匙串失败")?;
        info!("API 密钥已写入系统钥匙串");
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!("API 密钥已从系统钥匙串删除");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("删除钥匙串条目失败"),
        }
    }
}

/// 内存实现（测试与 headless 环境）
#[derive(Default)]
pub struct MemoryStore {
    secret: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: RwLock::new(Some(secret.to_string())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self
            .secret
            .read()
            .map_err(|_| anyhow::anyhow!("凭据锁中毒"))?
            .clone())
    }

    fn set(&self, secret: &str) -> Result<()> {
        *self
            .secret
            .write()
            .map_err(|_| anyhow::anyhow!("凭据锁中毒"))? = Some(secret.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self
            .secret
            .write()
            .map_err(|_| anyhow::anyhow!("凭据锁中毒"))? = None;
        Ok(())
    }
}
