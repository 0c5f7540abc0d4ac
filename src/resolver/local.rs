//! 本地动作解析器：按求值顺序执行规则，首个命中规则的结果即为解析结果
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::outcome::ResolveOutcome;
use super::{validate_qr_data, QrActionResolver};
use crate::compiler::{CompiledRule, CompiledRuleSet, RuleCompiler, RulePredicate};
use crate::config::GlobalConfig;
use crate::error::QrResult;
use crate::rule::{RuleLibrary, RuleLoader};
use crate::script::{ScanCaptures, ScriptContext, ScriptRuntime, TemplateScriptRuntime};

/// 本地动作解析器
#[derive(Debug, Clone)]
pub struct ActionResolver {
    rules: Arc<CompiledRuleSet>,
    runtime: Arc<dyn ScriptRuntime>,
}

impl ActionResolver {
    /// 使用内置模板脚本引擎创建解析器
    pub fn new(rule_lib: &RuleLibrary) -> Self {
        Self::with_runtime(rule_lib, Arc::new(TemplateScriptRuntime::new()))
    }

    /// 指定脚本引擎创建解析器
    pub fn with_runtime(rule_lib: &RuleLibrary, runtime: Arc<dyn ScriptRuntime>) -> Self {
        Self {
            rules: Arc::new(RuleCompiler::compile(rule_lib)),
            runtime,
        }
    }

    /// 按配置加载规则库（缓存优先）后创建解析器
    pub async fn from_config(config: &GlobalConfig) -> QrResult<Self> {
        let rule_lib = RuleLoader::load(config).await?;
        Ok(Self::new(&rule_lib))
    }

    pub fn rules(&self) -> &CompiledRuleSet {
        &self.rules
    }

    /// 同步求值
    pub fn evaluate(&self, qr_data: &str) -> QrResult<ResolveOutcome> {
        validate_qr_data(qr_data)?;

        for rule in &self.rules.rules {
            if let Some(result) = self.evaluate_rule(rule, qr_data)? {
                info!("扫码命中规则 '{}'（{}）", rule.name, rule.describe());
                return Ok(ResolveOutcome::matched(rule.name.clone(), result));
            }
        }

        debug!("扫码未命中任何有效规则：{}", qr_data);
        Ok(ResolveOutcome::NotFound)
    }

    /// 单条规则求值：`Ok(None)` 表示未命中，继续下一条
    fn evaluate_rule(&self, rule: &CompiledRule, qr_data: &str) -> QrResult<Option<serde_json::Value>> {
        let captures = match &rule.predicate {
            RulePredicate::Pattern(pattern) => match pattern.captures(qr_data) {
                Some(captures) => captures,
                None => return Ok(None),
            },
            RulePredicate::Script => ScanCaptures::whole(qr_data),
        };

        let ctx = ScriptContext {
            rule_name: &rule.name,
            qr_data,
            captures,
        };
        let result = self.runtime.run(&rule.script, &ctx)?;
        if result.is_none() {
            // 正则命中但脚本无结果，同样视为未命中
            debug!("规则 '{}' 脚本未返回结果，继续求值", rule.name);
        }
        Ok(result)
    }
}

#[async_trait]
impl QrActionResolver for ActionResolver {
    async fn resolve(&self, qr_data: &str) -> QrResult<ResolveOutcome> {
        self.evaluate(qr_data)
    }
}
