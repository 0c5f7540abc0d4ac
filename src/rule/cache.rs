//! 扫码动作规则的本地快照
//! 后端规则以 MessagePack 按字段名落盘；快照超过 `rule_cache_ttl` 即视为过期

use std::time::{Duration, SystemTime};

use rmp_serde::{Serializer, from_slice};
use serde::Serialize;
use tracing::debug;

use super::model::RuleLibrary;
use crate::config::GlobalConfig;
use crate::error::{QrActionError, QrResult};

/// 规则快照管理器
pub struct RuleCacheManager;

impl RuleCacheManager {
    /// 读取规则快照（不检查是否过期）
    pub async fn load_from_cache(config: &GlobalConfig) -> QrResult<RuleLibrary> {
        let bytes = tokio::fs::read(&config.rule_cache_path).await?;
        let rule_lib: RuleLibrary = from_slice(&bytes)
            .map_err(|e| QrActionError::MsgPackError(format!("规则快照 {} 无法读取：{}", config.rule_cache_path.display(), e)))?;

        debug!(
            "读取规则快照 {}：{} 条规则，启用 {} 条",
            config.rule_cache_path.display(),
            rule_lib.rules.len(),
            rule_lib.active_count()
        );
        Ok(rule_lib)
    }

    /// 读取未过期的规则快照；快照不存在、已过期或损坏时返回 `None`
    pub async fn load_fresh(config: &GlobalConfig) -> Option<RuleLibrary> {
        let age = Self::cache_age(config).await?;
        if age >= config.cache_max_age() {
            debug!("规则快照已存在 {:?}，超过有效期 {:?}", age, config.cache_max_age());
            return None;
        }
        Self::load_from_cache(config).await.ok()
    }

    /// 快照距上次写入的时长；文件不存在时返回 `None`
    pub async fn cache_age(config: &GlobalConfig) -> Option<Duration> {
        let modified = tokio::fs::metadata(&config.rule_cache_path).await.ok()?.modified().ok()?;
        // 时钟回拨时按刚写入处理
        Some(SystemTime::now().duration_since(modified).unwrap_or_default())
    }

    /// 写入规则快照
    pub async fn save_to_cache(config: &GlobalConfig, rule_lib: &RuleLibrary) -> QrResult<()> {
        let mut bytes = Vec::new();
        // 按字段名编码：`qr_code_pattern` 重命名与字段默认值在读回时依然生效
        rule_lib
            .serialize(&mut Serializer::new(&mut bytes).with_struct_map())
            .map_err(|e| QrActionError::MsgPackError(format!("规则快照编码失败：{}", e)))?;

        tokio::fs::write(&config.rule_cache_path, &bytes).await?;
        debug!("规则快照已写入 {}（{} 字节）", config.rule_cache_path.display(), bytes.len());
        Ok(())
    }

    /// 删除规则快照
    pub async fn clear_cache(config: &GlobalConfig) -> QrResult<()> {
        match tokio::fs::remove_file(&config.rule_cache_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
