//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::QrResult;

/// 规则管理接口路径
pub const QR_ACTIONS_PATH: &str = "api/base/qr-code-actions/";
/// 扫码动作执行接口路径
pub const QR_EXECUTE_PATH: &str = "api/base/qr-code-actions/execute/";

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 后端API根地址
    pub api_base_url: String,
    // 认证令牌（Bearer），为空则不携带
    pub auth_token: Option<String>,
    // 规则缓存路径
    pub rule_cache_path: PathBuf,
    // 规则缓存有效期（单位：秒），0 表示每次都重新拉取
    pub rule_cache_ttl: u64,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            auth_token: None,
            rule_cache_path: PathBuf::from("qr_code_actions.mp"),
            rule_cache_ttl: 300,
            http_timeout: 30,
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 拼接接口完整URL（根地址缺少末尾斜杠时自动补齐）
    pub fn endpoint(&self, path: &str) -> QrResult<Url> {
        let mut base = self.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.rule_cache_ttl)
    }
}

/// 配置管理器（单例）
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn auth_token(mut self, token: Option<String>) -> Self {
        self.config.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn rule_cache_path(mut self, path: PathBuf) -> Self {
        self.config.rule_cache_path = path;
        self
    }

    pub fn rule_cache_ttl(mut self, ttl: u64) -> Self {
        self.config.rule_cache_ttl = ttl;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
