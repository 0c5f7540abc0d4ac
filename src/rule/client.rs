//! 规则管理客户端
//! 对接后端 `/api/base/qr-code-actions/` 的增删改查接口

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::model::{QrActionRule, RuleDraft, RuleLibrary};
use crate::config::{GlobalConfig, QR_ACTIONS_PATH};
use crate::error::{QrActionError, QrResult};

pub(crate) const USER_AGENT: &str = concat!("qraction/", env!("CARGO_PKG_VERSION"));

/// 按配置构建HTTP客户端
pub(crate) fn build_http_client(config: &GlobalConfig) -> QrResult<Client> {
    Ok(Client::builder()
        .timeout(config.timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

/// 携带认证头
pub(crate) fn with_auth(request: RequestBuilder, config: &GlobalConfig) -> RequestBuilder {
    match &config.auth_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// 从错误响应中提取可读信息：优先 `error`，其次 `message`，否则回退为状态码
pub(crate) async fn error_from_response(response: Response) -> QrActionError {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let message = ["error", "message", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("サーバーエラー: {}", status.as_u16()));

    QrActionError::ResolverStatus {
        status: status.as_u16(),
        message,
    }
}

/// 规则管理客户端
#[derive(Debug, Clone)]
pub struct RuleClient {
    client: Client,
    config: GlobalConfig,
}

impl RuleClient {
    pub fn new(config: GlobalConfig) -> QrResult<Self> {
        Ok(Self {
            client: build_http_client(&config)?,
            config,
        })
    }

    /// 拉取规则列表，`active` 为 Some 时按启用状态过滤
    pub async fn list(&self, active: Option<bool>) -> QrResult<RuleLibrary> {
        let mut url = self.config.endpoint(QR_ACTIONS_PATH)?;
        if let Some(active) = active {
            url.query_pairs_mut().append_pair("is_active", if active { "true" } else { "false" });
        }
        debug!("拉取规则列表：{}", url);

        let response = with_auth(self.client.get(url), &self.config).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        let rule_lib = RuleLibrary::from_json_slice(&bytes)
            .map_err(|e| QrActionError::RuleParseError(format!("规则列表解析失败：{}", e)))?;
        debug!("规则列表拉取成功，规则数：{}", rule_lib.rules.len());
        Ok(rule_lib)
    }

    /// 新建规则
    pub async fn create(&self, draft: &RuleDraft) -> QrResult<QrActionRule> {
        let url = self.config.endpoint(QR_ACTIONS_PATH)?;
        let response = with_auth(self.client.post(url), &self.config)
            .json(draft)
            .send()
            .await?;
        Self::parse_rule(response).await
    }

    /// 更新规则
    pub async fn update(&self, id: &str, draft: &RuleDraft) -> QrResult<QrActionRule> {
        let url = self.rule_url(id)?;
        let response = with_auth(self.client.put(url), &self.config)
            .json(draft)
            .send()
            .await?;
        Self::parse_rule(response).await
    }

    /// 删除规则
    pub async fn delete(&self, id: &str) -> QrResult<()> {
        let url = self.rule_url(id)?;
        let response = with_auth(self.client.delete(url), &self.config).send().await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            _ => Err(error_from_response(response).await),
        }
    }

    fn rule_url(&self, id: &str) -> QrResult<url::Url> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(QrActionError::InvalidInput(format!("无效规则ID：{:?}", id)));
        }
        self.config.endpoint(&format!("{}{}/", QR_ACTIONS_PATH, id))
    }

    async fn parse_rule(response: Response) -> QrResult<QrActionRule> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json::<QrActionRule>().await?),
            _ => Err(error_from_response(response).await),
        }
    }
}
