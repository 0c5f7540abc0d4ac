//! 结果归一化
//! 把原始结果（含缺少 `action` 的旧格式）转换为封闭的效果枚举，分发逻辑只面对归一化后的结果

use std::collections::BTreeMap;
use serde::Serialize;
use serde_json::Value;

use super::model::{RawEffect, ACTION_NAVIGATE, ACTION_UPDATE_FIELDS, ACTION_UPDATE_SEARCH};

/// 归一化后的效果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CanonicalEffect {
    /// 页面跳转，可携带状态
    Navigate { to: String, state: Option<Value> },
    /// 覆盖检索条件
    UpdateSearch { query: String },
    /// 覆盖表单字段
    UpdateFields { fields: BTreeMap<String, String> },
    /// 业务动作（入库、出库、移库等），交由页面处理
    Domain { kind: String, payload: Value },
    /// 无法识别的结果，走兜底逻辑
    Unrecognized { action: Option<String> },
}

impl CanonicalEffect {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, CanonicalEffect::Unrecognized { .. })
    }
}

/// 归一化原始结果
pub fn normalize(raw: &RawEffect) -> CanonicalEffect {
    match raw.action.as_deref() {
        Some(ACTION_NAVIGATE) => navigate_effect(raw),
        Some(ACTION_UPDATE_SEARCH) => search_effect(raw),
        Some(ACTION_UPDATE_FIELDS) => fields_effect(raw),
        Some(kind) => match &raw.payload {
            Some(payload) => CanonicalEffect::Domain {
                kind: kind.to_string(),
                payload: payload.clone(),
            },
            None => unrecognized(raw),
        },
        // 旧格式：未携带 action，按顶层字段推断
        None => {
            if non_empty(&raw.update_search) {
                search_effect(raw)
            } else if raw.update_fields.is_some() {
                fields_effect(raw)
            } else {
                unrecognized(raw)
            }
        }
    }
}

fn navigate_effect(raw: &RawEffect) -> CanonicalEffect {
    match &raw.navigate {
        Some(to) if !to.trim().is_empty() => CanonicalEffect::Navigate {
            to: to.clone(),
            state: raw.state.clone(),
        },
        _ => unrecognized(raw),
    }
}

fn search_effect(raw: &RawEffect) -> CanonicalEffect {
    match &raw.update_search {
        Some(query) if !query.is_empty() => CanonicalEffect::UpdateSearch { query: query.clone() },
        _ => unrecognized(raw),
    }
}

fn fields_effect(raw: &RawEffect) -> CanonicalEffect {
    let Some(fields) = &raw.update_fields else {
        return unrecognized(raw);
    };

    let fields = fields
        .iter()
        .filter_map(|(name, value)| field_text(value).map(|text| (name.clone(), text)))
        .collect();
    CanonicalEffect::UpdateFields { fields }
}

/// 字段值转文本：数值/布尔转字符串，null 忽略，复合值按紧凑JSON
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn unrecognized(raw: &RawEffect) -> CanonicalEffect {
    CanonicalEffect::Unrecognized {
        action: raw.action.clone(),
    }
}
