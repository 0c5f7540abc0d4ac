//! 解析结果定义

use serde::Serialize;
use serde_json::Value;

use crate::effect::{normalize, CanonicalEffect, RawEffect};

/// 单次扫码的解析结果（命中 / 未命中）；错误通过 `QrResult` 的 `Err` 表达
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Matched {
        #[serde(skip_serializing_if = "Option::is_none")]
        action_name: Option<String>,
        result: Value,
    },
    NotFound,
}

impl ResolveOutcome {
    pub fn matched(action_name: impl Into<String>, result: Value) -> Self {
        Self::Matched {
            action_name: Some(action_name.into()),
            result,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// 命中时返回归一化后的效果
    pub fn effect(&self) -> Option<CanonicalEffect> {
        match self {
            Self::Matched { result, .. } => Some(normalize(&RawEffect::from(result.clone()))),
            Self::NotFound => None,
        }
    }
}
