//! 规则数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::fmt;
use serde::{Deserialize, Serialize};

/// 规则判定方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// 正则判定：`qr_code_pattern` 匹配后执行脚本生成结果
    #[default]
    Regex,
    /// 脚本判定：脚本自身完成判定并返回结果
    Script,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Regex => "regex",
            ActionType::Script => "script",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

/// 扫码动作规则（后端管理，客户端只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrActionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "qr_code_pattern", alias = "pattern", default)]
    pub pattern: String,
    #[serde(default)]
    pub script: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl QrActionRule {
    /// 正则判定规则
    pub fn regex(name: impl Into<String>, pattern: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            action_type: ActionType::Regex,
            description: String::new(),
            pattern: pattern.into(),
            script: script.into(),
            is_active: true,
        }
    }

    /// 脚本判定规则
    pub fn script(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            action_type: ActionType::Script,
            description: String::new(),
            pattern: String::new(),
            script: script.into(),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 转换为新建/更新请求体
    pub fn to_draft(&self) -> RuleDraft {
        RuleDraft {
            name: self.name.clone(),
            action_type: self.action_type,
            description: self.description.clone(),
            pattern: self.pattern.clone(),
            script: self.script.clone(),
            is_active: self.is_active,
        }
    }
}

impl fmt::Display for QrActionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.action_type)
    }
}

/// 规则新建/更新请求体（不含 id）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "qr_code_pattern", default)]
    pub pattern: String,
    pub script: String,
    pub is_active: bool,
}

/// 完整规则库
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleLibrary {
    pub rules: Vec<QrActionRule>,
}

impl RuleLibrary {
    pub fn new(rules: Vec<QrActionRule>) -> Self {
        Self { rules }
    }

    pub fn active_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_active).count()
    }

    /// 解析规则文件：兼容纯数组与分页结构 `{"results": [...]}`
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RuleListBody {
            Plain(Vec<QrActionRule>),
            Paged { results: Vec<QrActionRule> },
        }

        let rules = match serde_json::from_slice::<RuleListBody>(bytes)? {
            RuleListBody::Plain(rules) => rules,
            RuleListBody::Paged { results } => results,
        };
        Ok(Self { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_wire_format() {
        let json = r#"{
            "id": "6f1c",
            "name": "棚番",
            "action_type": "regex",
            "description": "",
            "qr_code_pattern": "^LOC:",
            "script": "null",
            "is_active": true
        }"#;
        let rule: QrActionRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.action_type, ActionType::Regex);
        assert_eq!(rule.pattern, "^LOC:");

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["qr_code_pattern"], "^LOC:");
        assert!(value.get("pattern").is_none());
    }

    #[test]
    fn test_rule_defaults() {
        let rule: QrActionRule = serde_json::from_str(r#"{"name": "x", "script": "null"}"#).unwrap();
        assert_eq!(rule.action_type, ActionType::Regex);
        assert!(rule.is_active);
        assert!(rule.id.is_none());
    }

    #[test]
    fn test_library_accepts_paged_body() {
        let plain = br#"[{"name": "a", "script": "null"}]"#;
        let paged = br#"{"count": 1, "results": [{"name": "a", "script": "null"}]}"#;
        assert_eq!(RuleLibrary::from_json_slice(plain).unwrap().rules.len(), 1);
        assert_eq!(RuleLibrary::from_json_slice(paged).unwrap().rules.len(), 1);
    }

    #[test]
    fn test_draft_omits_id() {
        let mut rule = QrActionRule::script("s", "null");
        rule.id = Some("abc".to_string());
        let value = serde_json::to_value(rule.to_draft()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["action_type"], "script");
    }
}
