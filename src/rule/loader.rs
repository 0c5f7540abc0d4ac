//! 规则加载管理器
//! 负责从本地缓存、规则文件或远程接口加载规则库

use std::path::Path;
use tracing::{debug, warn};

use super::cache::RuleCacheManager;
use super::client::RuleClient;
use super::model::RuleLibrary;
use crate::config::GlobalConfig;
use crate::error::{QrActionError, QrResult};

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载规则库：未过期的本地快照优先，否则拉取远程；远程不可用时退回过期快照
    pub async fn load(config: &GlobalConfig) -> QrResult<RuleLibrary> {
        if let Some(rule_lib) = RuleCacheManager::load_fresh(config).await {
            debug!("使用本地规则快照");
            return Ok(rule_lib);
        }

        match Self::refresh(config).await {
            Ok(rule_lib) => Ok(rule_lib),
            Err(e) => match RuleCacheManager::load_from_cache(config).await {
                Ok(stale) => {
                    warn!("远程规则拉取失败（{}），继续使用过期的本地快照", e);
                    Ok(stale)
                }
                Err(_) => Err(e),
            },
        }
    }

    /// 强制拉取远程规则库并写入本地缓存
    pub async fn refresh(config: &GlobalConfig) -> QrResult<RuleLibrary> {
        let rule_lib = Self::fetch_remote(config).await?;

        if let Err(e) = RuleCacheManager::save_to_cache(config, &rule_lib).await {
            warn!("规则库缓存到本地失败：{}", e);
        } else {
            debug!("远程规则库已缓存到本地");
        }

        Ok(rule_lib)
    }

    /// 拉取远程规则库（全量，启用状态在编译阶段过滤）
    pub async fn fetch_remote(config: &GlobalConfig) -> QrResult<RuleLibrary> {
        let client = RuleClient::new(config.clone())?;
        client.list(None).await.map_err(|e| match e {
            QrActionError::RuleParseError(_) => e,
            other => QrActionError::RuleLoadError(other.to_string()),
        })
    }

    /// 从本地JSON规则文件加载
    pub async fn load_from_file(path: impl AsRef<Path>) -> QrResult<RuleLibrary> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            QrActionError::RuleLoadError(format!("读取规则文件 {} 失败：{}", path.display(), e))
        })?;

        let rule_lib = RuleLibrary::from_json_slice(&bytes)
            .map_err(|e| QrActionError::RuleParseError(format!("{}：{}", path.display(), e)))?;
        debug!("规则文件 {} 加载成功，规则数：{}", path.display(), rule_lib.rules.len());
        Ok(rule_lib)
    }
}
