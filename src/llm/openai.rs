// OpenAI 兼容接口客户端 - 每次 complete 恰好发出一次 HTTPS POST
//
// 出站请求不设超时也不重试;过期结果的丢弃由
// Actor 侧的实例令牌保证,这里不做取消

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use super::{ChatCompletionRequest, ChatMessage, CompletionApi, CompletionError};
use crate::credentials::CredentialStore;
use crate::settings::SettingsManager;

/// 固定采样参数
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// OpenAI 聊天补全客户端
pub struct OpenAiClient {
    client: Client,
    settings: Arc<SettingsManager>,
    credentials: Arc<dyn CredentialStore>,
}

impl OpenAiClient {
    /// 接受共享的 HTTP 客户端以复用连接池
    pub fn new(
        client: Client,
        settings: Arc<SettingsManager>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            settings,
            credentials,
        }
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, command: &str) -> Result<String, CompletionError> {
        let api_key = match self.credentials.get() {
            Ok(Some(key)) => key,
            Ok(None) => return Err(CompletionError::MissingCredential),
            Err(e) => {
                warn!("凭据读取失败: {}", e);
                return Err(CompletionError::MissingCredential);
            }
        };

        // 模型与系统角色在请求构建时读取,配置变更即时生效
        let config = self.settings.get().await;
        let request = ChatCompletionRequest {
            model: config.llm.model.clone(),
            messages: vec![
                ChatMessage::system(config.llm.system_prompt.clone()),
                ChatMessage::user(command),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        info!(
            "发起补全请求: model={}, 指令 {} 字符",
            request.model,
            command.chars().count()
        );

        let response = self
            .client
            .post(&config.llm.endpoint)
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(CompletionError::Transport)?;

        parse_completion_response(status, &body)
    }
}

/// 解析响应体
///
/// `{"error":{"message":m}}` 归为 ServiceError,消息原样透出;
/// 成功状态码但形状不符归为 MalformedResponse
fn parse_completion_response(status: StatusCode, body: &str) -> Result<String, CompletionError> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return Err(if status.is_success() {
                CompletionError::MalformedResponse(format!("JSON 解析失败: {}", e))
            } else {
                CompletionError::Service(format!("HTTP {}", status.as_u16()))
            });
        }
    };

    if let Some(message) = value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(CompletionError::Service(message.to_string()));
    }

    if let Some(content) = value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
    {
        return Ok(content.to_string());
    }

    if !status.is_success() {
        return Err(CompletionError::Service(format!(
            "HTTP {}",
            status.as_u16()
        )));
    }
    Err(CompletionError::MalformedResponse(
        "响应中既无 choices 也无 error".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryStore;
    use crate::models::{ConfigUpdate, LlmSettings};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_client(endpoint: String, store: MemoryStore) -> OpenAiClient {
        let dir = tempfile::tempdir().unwrap();
        let settings = Arc::new(
            SettingsManager::new(dir.path().join("config.json"))
                .await
                .unwrap(),
        );
        settings
            .update(ConfigUpdate {
                llm: Some(LlmSettings {
                    endpoint,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        // tempdir 随测试结束删除,配置已在内存中
        OpenAiClient::new(Client::new(), settings, Arc::new(store))
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "system", "content": "You are a helpful assistant."}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "答案"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(
            format!("{}/v1/chat/completions", server.uri()),
            MemoryStore::with_secret("sk-test"),
        )
        .await;

        let result = client.complete("解释这段文本").await.unwrap();
        assert_eq!(result, "答案");
    }

    #[tokio::test]
    async fn test_error_payload_becomes_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "rate limited"}
            })))
            .mount(&server)
            .await;

        let client = test_client(
            format!("{}/v1/chat/completions", server.uri()),
            MemoryStore::with_secret("sk-test"),
        )
        .await;

        let err = client.complete("任意指令").await.unwrap_err();
        match &err {
            CompletionError::Service(message) => assert_eq!(message, "rate limited"),
            other => panic!("应归类为 Service,实际是 {:?}", other),
        }
        // 浮窗展示形态
        assert_eq!(format!("Error: {}", err), "Error: rate limited");
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network_call() {
        let server = MockServer::start().await;
        // expect(0): 无密钥时不得发出任何请求
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(
            format!("{}/v1/chat/completions", server.uri()),
            MemoryStore::new(),
        )
        .await;

        let err = client.complete("任意指令").await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": "bar"})))
            .mount(&server)
            .await;

        let client = test_client(
            format!("{}/v1/chat/completions", server.uri()),
            MemoryStore::with_secret("sk-test"),
        )
        .await;

        let err = client.complete("任意指令").await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // 未监听的端口,连接立即失败
        let client = test_client(
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            MemoryStore::with_secret("sk-test"),
        )
        .await;

        let err = client.complete("任意指令").await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
    }

    #[test]
    fn test_parse_non_success_without_payload() {
        let err = parse_completion_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        match err {
            CompletionError::Service(message) => assert_eq!(message, "HTTP 502"),
            other => panic!("应归类为 Service,实际是 {:?}", other),
        }
    }
}
