//! 扫码结果描述模型
//! 解析服务返回的 `result` 对象，字段类型不符时按缺失处理，不报错

use serde::Serialize;
use serde_json::{Map, Value};

/// 已知动作标签
pub const ACTION_NAVIGATE: &str = "navigate";
pub const ACTION_UPDATE_SEARCH: &str = "update_search";
pub const ACTION_UPDATE_FIELDS: &str = "update_fields";

/// 解析服务返回的原始结果描述
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawEffect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(rename = "updateSearch", skip_serializing_if = "Option::is_none")]
    pub update_search: Option<String>,
    #[serde(rename = "updateFields", skip_serializing_if = "Option::is_none")]
    pub update_fields: Option<Map<String, Value>>,
    /// 未识别的键，原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEffect {
    pub fn with_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }
}

impl From<Value> for RawEffect {
    fn from(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        // null 视为缺失，其余值类型不符时留在 extra 中
        fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
            match map.remove(key) {
                Some(Value::String(s)) => Some(s),
                Some(Value::Null) | None => None,
                Some(other) => {
                    map.insert(key.to_string(), other);
                    None
                }
            }
        }
        fn take_value(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
            map.remove(key).filter(|v| !v.is_null())
        }

        let action = take_string(&mut map, "action");
        let navigate = take_string(&mut map, "navigate");
        let update_search = take_string(&mut map, "updateSearch");
        let payload = take_value(&mut map, "payload");
        let state = take_value(&mut map, "state");
        let update_fields = match map.remove("updateFields") {
            Some(Value::Object(fields)) => Some(fields),
            Some(Value::Null) | None => None,
            Some(other) => {
                map.insert("updateFields".to_string(), other);
                None
            }
        };

        Self {
            action,
            payload,
            navigate,
            state,
            update_search,
            update_fields,
            extra: map,
        }
    }
}
