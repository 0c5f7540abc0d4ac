//! 结果模板渲染工具
//! 支持 \1/$1 位置分组、${name} 命名分组与 ${qr_data} 原始文本三种占位符

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// 占位符匹配：命名引用 `${name}` 或位置引用 `$N` / `\N`（N 取连续全部数字）
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|[$\\](\d+)"#).unwrap()
});

/// 原始文本占位符名
pub const QR_DATA_PLACEHOLDER: &str = "qr_data";

/// 扫码文本的正则捕获结果（与具体正则实例解耦，可合并）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCaptures {
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl ScanCaptures {
    /// 仅含整体匹配（第 0 组）的捕获结果
    pub fn whole(text: &str) -> Self {
        Self {
            groups: vec![Some(text.to_string())],
            named: HashMap::new(),
        }
    }

    pub fn from_regex(regex: &Regex, caps: &Captures) -> Self {
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        Self { groups, named }
    }

    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    pub fn named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// 以 `other` 覆盖当前捕获：位置分组整体替换，命名分组逐个覆盖
    pub fn merge(&mut self, other: ScanCaptures) {
        if !other.groups.is_empty() {
            self.groups = other.groups;
        }
        self.named.extend(other.named);
    }
}

/// 渲染单个字符串模板，单遍替换，已替换的内容不会被再次解析
pub fn render_str(template: &str, captures: &ScanCaptures, qr_data: &str) -> String {
    if !template.contains('$') && !template.contains('\\') {
        return template.to_string();
    }

    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            if let Some(name) = caps.get(1) {
                let name = name.as_str();
                if name == QR_DATA_PLACEHOLDER {
                    return qr_data.to_string();
                }
                return captures.named(name).unwrap_or_default().to_string();
            }
            caps.get(2)
                .and_then(|index| index.as_str().parse::<usize>().ok())
                .and_then(|index| captures.group(index))
                .unwrap_or_default()
                .to_string()
        })
        .into_owned()
}

/// 递归渲染JSON模板中的所有字符串值（对象键保持不变）
pub fn render_value(template: Value, captures: &ScanCaptures, qr_data: &str) -> Value {
    match template {
        Value::String(s) => Value::String(render_str(&s, captures, qr_data)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| render_value(item, captures, qr_data))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, render_value(item, captures, qr_data)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loc_captures() -> ScanCaptures {
        let regex = Regex::new(r"LOC:(?P<wh>[^:]+):(.+)").unwrap();
        let caps = regex.captures("LOC:MAIN-WH:A-01-01").unwrap();
        ScanCaptures::from_regex(&regex, &caps)
    }

    #[test]
    fn test_render_dollar_and_backslash_groups() {
        let caps = loc_captures();
        assert_eq!(render_str("$1/\\2", &caps, "x"), "MAIN-WH/A-01-01");
        assert_eq!(render_str("$0", &caps, "x"), "LOC:MAIN-WH:A-01-01");
    }

    #[test]
    fn test_render_named_and_qr_data() {
        let caps = loc_captures();
        assert_eq!(render_str("${wh}|${qr_data}", &caps, "RAW"), "MAIN-WH|RAW");
    }

    #[test]
    fn test_missing_groups_render_empty() {
        let caps = loc_captures();
        assert_eq!(render_str("[$9][${nope}]", &caps, "x"), "[][]");
    }

    #[test]
    fn test_multi_digit_group_is_not_split() {
        // $10 引用第 10 组，而不是第 1 组后接 "0"
        let regex = Regex::new(r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)").unwrap();
        let caps = regex.captures("abcdefghij").unwrap();
        let caps = ScanCaptures::from_regex(&regex, &caps);
        assert_eq!(render_str("$10-$1", &caps, ""), "j-a");
    }

    #[test]
    fn test_substituted_text_is_not_reparsed() {
        let caps = ScanCaptures::whole("$1");
        assert_eq!(render_str("${qr_data}", &caps, "${qr_data}$1"), "${qr_data}$1");
    }

    #[test]
    fn test_render_value_recurses() {
        let caps = loc_captures();
        let rendered = render_value(
            json!({"action": "update_fields", "updateFields": {"warehouse": "$1", "sourceLocation": "$2"}, "n": 3}),
            &caps,
            "",
        );
        assert_eq!(
            rendered,
            json!({"action": "update_fields", "updateFields": {"warehouse": "MAIN-WH", "sourceLocation": "A-01-01"}, "n": 3})
        );
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = loc_captures();
        let mut other = ScanCaptures::whole("other");
        other.named.insert("wh".to_string(), "SUB".to_string());
        base.merge(other);
        assert_eq!(base.group(0), Some("other"));
        assert_eq!(base.group(1), None);
        assert_eq!(base.named("wh"), Some("SUB"));
    }
}
