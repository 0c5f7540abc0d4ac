//! 远程动作解析器：调用后端 `POST /api/base/qr-code-actions/execute/`
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::outcome::ResolveOutcome;
use super::{validate_qr_data, QrActionResolver};
use crate::config::{GlobalConfig, QR_EXECUTE_PATH};
use crate::error::{QrActionError, QrResult};
use crate::rule::client::{build_http_client, error_from_response, with_auth};

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    qr_data: &'a str,
}

/// 远程动作解析器
#[derive(Debug, Clone)]
pub struct RemoteResolver {
    client: Client,
    config: GlobalConfig,
}

impl RemoteResolver {
    pub fn new(config: GlobalConfig) -> QrResult<Self> {
        Ok(Self {
            client: build_http_client(&config)?,
            config,
        })
    }

    /// 解析 200 响应体：必须是带 `result` 的JSON对象
    fn parse_matched(body: &[u8]) -> QrResult<ResolveOutcome> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| QrActionError::MalformedResponse(format!("响应体不是合法JSON：{}", e)))?;
        let Value::Object(mut map) = value else {
            return Err(QrActionError::MalformedResponse("响应体不是JSON对象".to_string()));
        };

        let result = match map.remove("result") {
            Some(Value::Null) | None => {
                return Err(QrActionError::MalformedResponse("响应体缺少 result 字段".to_string()));
            }
            Some(result) => result,
        };
        let action_name = match map.remove("action_name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };

        Ok(ResolveOutcome::Matched { action_name, result })
    }
}

#[async_trait]
impl QrActionResolver for RemoteResolver {
    async fn resolve(&self, qr_data: &str) -> QrResult<ResolveOutcome> {
        validate_qr_data(qr_data)?;

        let url = self.config.endpoint(QR_EXECUTE_PATH)?;
        debug!("请求远程解析：{}", url);
        let response = with_auth(self.client.post(url), &self.config)
            .json(&ExecuteRequest { qr_data })
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("远程解析未命中：{}", qr_data);
                Ok(ResolveOutcome::NotFound)
            }
            status if status.is_success() => {
                let body = response.bytes().await?;
                Self::parse_matched(&body)
            }
            _ => Err(error_from_response(response).await),
        }
    }
}
