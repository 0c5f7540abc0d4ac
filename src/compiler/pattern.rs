//! 编译后模式模型
//! 正则编译后的结构

use std::fmt;
use regex::Regex;

use crate::rule::ActionType;
use crate::script::ScanCaptures;

/// 起始锚定正则：仅当模式从扫码文本开头匹配时才算命中
#[derive(Debug, Clone)]
pub struct AnchoredPattern {
    regex: Regex,
    source: String,
}

impl AnchoredPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(r"\A(?:{})", source))?;
        Ok(Self {
            regex,
            source: source.to_string(),
        })
    }

    /// 匹配输入，返回捕获结果
    pub fn captures(&self, input: &str) -> Option<ScanCaptures> {
        self.regex
            .captures(input)
            .map(|caps| ScanCaptures::from_regex(&self.regex, &caps))
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// 原始模式文本
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// 规则判定条件
#[derive(Debug, Clone)]
pub enum RulePredicate {
    /// 正则命中后执行脚本
    Pattern(AnchoredPattern),
    /// 由脚本自身判定
    Script,
}

/// 编译后的单条规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub action_type: ActionType,
    pub predicate: RulePredicate,
    pub script: String,
}

impl CompiledRule {
    pub fn describe(&self) -> &str {
        match &self.predicate {
            RulePredicate::Pattern(p) => p.as_str(),
            RulePredicate::Script => "script",
        }
    }
}

/// 编译阶段被跳过的规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for SkippedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}：{}", self.name, self.reason)
    }
}

/// 编译后的规则集（已按求值顺序排列）
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    pub rules: Vec<CompiledRule>,
    pub skipped: Vec<SkippedRule>,
}

impl CompiledRuleSet {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 求值顺序下的规则名列表
    pub fn evaluation_order(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}
