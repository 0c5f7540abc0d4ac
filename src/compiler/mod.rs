//! 编译模块：将原始规则编译为按序求值的规则集
pub mod pattern;
pub mod compiler;

pub use self::pattern::{AnchoredPattern, CompiledRule, CompiledRuleSet, RulePredicate, SkippedRule};
pub use self::compiler::RuleCompiler;
