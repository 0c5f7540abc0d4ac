//! 规则编译器核心
//! 负责过滤无效规则、编译正则模式并确定求值顺序

use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, warn};

use super::pattern::{AnchoredPattern, CompiledRule, CompiledRuleSet, RulePredicate, SkippedRule};
use crate::rule::{ActionType, QrActionRule, RuleLibrary};

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则库
    ///
    /// 求值顺序：脚本判定规则在前，正则判定规则在后；同类规则按名称升序。
    /// 未启用的规则直接丢弃，正则无效或为空的规则记入 `skipped`。
    pub fn compile(rule_lib: &RuleLibrary) -> CompiledRuleSet {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        let mut active: Vec<&QrActionRule> = rule_lib
            .rules
            .iter()
            .filter(|rule| {
                if !rule.is_active {
                    stats.inactive_count += 1;
                }
                rule.is_active
            })
            .collect();
        active.sort_by(|a, b| Self::evaluation_cmp(a, b));

        let mut compiled = CompiledRuleSet::default();
        for rule in active {
            match Self::compile_rule(rule) {
                Ok(compiled_rule) => {
                    match compiled_rule.action_type {
                        ActionType::Regex => stats.regex_count += 1,
                        ActionType::Script => stats.script_count += 1,
                    }
                    compiled.rules.push(compiled_rule);
                }
                Err(reason) => {
                    warn!("跳过规则 '{}'：{}", rule.name, reason);
                    compiled.skipped.push(SkippedRule {
                        name: rule.name.clone(),
                        reason,
                    });
                }
            }
        }

        debug!("✅ 规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：脚本规则{}条、正则规则{}条、未启用{}条、跳过{}条",
            stats.script_count,
            stats.regex_count,
            stats.inactive_count,
            compiled.skipped.len()
        );

        compiled
    }

    /// 规则求值顺序比较
    pub fn evaluation_cmp(a: &QrActionRule, b: &QrActionRule) -> Ordering {
        Self::type_rank(a.action_type)
            .cmp(&Self::type_rank(b.action_type))
            .then_with(|| a.name.cmp(&b.name))
    }

    fn type_rank(action_type: ActionType) -> u8 {
        match action_type {
            ActionType::Script => 0,
            ActionType::Regex => 1,
        }
    }

    /// 编译单条规则，失败时返回跳过原因
    fn compile_rule(rule: &QrActionRule) -> Result<CompiledRule, String> {
        let predicate = match rule.action_type {
            ActionType::Regex => {
                let source = rule.pattern.trim();
                if source.is_empty() {
                    return Err("正则判定规则缺少 qr_code_pattern".to_string());
                }
                let pattern = AnchoredPattern::new(source)
                    .map_err(|e| format!("正则编译失败：{}", e))?;
                RulePredicate::Pattern(pattern)
            }
            ActionType::Script => RulePredicate::Script,
        };

        Ok(CompiledRule {
            name: rule.name.clone(),
            action_type: rule.action_type,
            predicate,
            script: rule.script.clone(),
        })
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    regex_count: usize,
    script_count: usize,
    inactive_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_rules_before_regex_then_by_name() {
        let lib = RuleLibrary::new(vec![
            QrActionRule::regex("b-regex", "^B", "null"),
            QrActionRule::script("z-script", "null"),
            QrActionRule::regex("a-regex", "^A", "null"),
            QrActionRule::script("m-script", "null"),
        ]);
        let compiled = RuleCompiler::compile(&lib);
        assert_eq!(
            compiled.evaluation_order(),
            vec!["m-script", "z-script", "a-regex", "b-regex"]
        );
    }

    #[test]
    fn test_inactive_rules_are_dropped() {
        let lib = RuleLibrary::new(vec![
            QrActionRule::regex("off", "^A", "null").inactive(),
            QrActionRule::regex("on", "^A", "null"),
        ]);
        let compiled = RuleCompiler::compile(&lib);
        assert_eq!(compiled.evaluation_order(), vec!["on"]);
        assert!(compiled.skipped.is_empty());
    }

    #[test]
    fn test_invalid_and_empty_patterns_are_skipped() {
        let lib = RuleLibrary::new(vec![
            QrActionRule::regex("broken", "(unclosed", "null"),
            QrActionRule::regex("empty", "  ", "null"),
            QrActionRule::regex("ok", "^OK", "null"),
        ]);
        let compiled = RuleCompiler::compile(&lib);
        assert_eq!(compiled.evaluation_order(), vec!["ok"]);
        let skipped: Vec<&str> = compiled.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["broken", "empty"]);
    }

    #[test]
    fn test_script_rule_ignores_pattern() {
        let mut rule = QrActionRule::script("s", "null");
        rule.pattern = "(invalid".to_string();
        let compiled = RuleCompiler::compile(&RuleLibrary::new(vec![rule]));
        assert_eq!(compiled.len(), 1);
        assert!(matches!(compiled.rules[0].predicate, RulePredicate::Script));
    }
}
