// LLM 模块 - 聊天补全请求的构建、发送与错误归类

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiClient;

/// 补全请求错误分类
///
/// 四类错误都会被渲染为浮窗里的一行可读文本,均不致命
#[derive(Debug, Error)]
pub enum CompletionError {
    /// 钥匙串中没有存储密钥
    #[error("未配置 API Key,请先在设置中保存")]
    MissingCredential,

    /// 网络/传输层失败
    #[error("网络请求失败: {0}")]
    Transport(#[source] reqwest::Error),

    /// 远端返回了显式错误载荷,消息原样透出
    #[error("{0}")]
    Service(String),

    /// 成功状态码但响应无法解析或形状不符
    #[error("响应格式异常: {0}")]
    MalformedResponse(String),
}

/// 补全调用接口
///
/// Actor 只依赖该接口;真实实现为 OpenAiClient,测试用桩替换
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// 发起一次补全调用,返回结果文本
    async fn complete(&self, command: &str) -> Result<String, CompletionError>;
}

/// 聊天消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 请求体 `{model, messages, temperature, max_tokens}`
#[derive(Clone, Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 把选区文本与用户提示词合成一条指令
///
/// 选区为空时只发送提示词
pub fn build_command(selected_text: &str, prompt: &str) -> String {
    if selected_text.trim().is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n\n{}", prompt, selected_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_combines_prompt_and_selection() {
        let command = build_command("selected words", "translate");
        assert_eq!(command, "translate\n\nselected words");
    }

    #[test]
    fn test_build_command_without_selection() {
        assert_eq!(build_command("   ", "just ask"), "just ask");
    }

    #[test]
    fn test_service_error_renders_raw_message() {
        let err = CompletionError::Service("rate limited".to_string());
        assert_eq!(format!("Error: {}", err), "Error: rate limited");
    }
}
