//! 规则脚本运行时
//! 规则脚本对客户端不透明，执行引擎通过 `ScriptRuntime` 注入

use std::fmt::Debug;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::template::{render_value, ScanCaptures};
use crate::error::{QrActionError, QrResult};

/// 脚本判定守卫键：正则不匹配时脚本返回空结果
pub const WHEN_KEY: &str = "$when";

/// 脚本执行上下文
#[derive(Debug, Clone)]
pub struct ScriptContext<'a> {
    pub rule_name: &'a str,
    pub qr_data: &'a str,
    /// 正则判定规则的分组捕获；脚本判定规则仅含整体文本
    pub captures: ScanCaptures,
}

/// 脚本执行引擎
pub trait ScriptRuntime: Debug + Send + Sync {
    /// 执行脚本：`Ok(None)` 表示未产生结果（视为未命中），`Err` 表示执行失败
    fn run(&self, script: &str, ctx: &ScriptContext<'_>) -> QrResult<Option<Value>>;
}

/// 内置模板脚本引擎
///
/// 脚本体是一段JSON结果模板：
/// - `null` 不产生结果；
/// - 对象可带 `"$when"` 守卫正则，未匹配则不产生结果，匹配的分组覆盖到模板上下文；
/// - 所有字符串值按占位符渲染后原样返回。
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateScriptRuntime;

impl TemplateScriptRuntime {
    pub fn new() -> Self {
        Self
    }

    fn apply_guard(
        template: &mut Value,
        ctx: &ScriptContext<'_>,
        captures: &mut ScanCaptures,
    ) -> QrResult<bool> {
        let Some(map) = template.as_object_mut() else {
            return Ok(true);
        };
        let Some(guard) = map.remove(WHEN_KEY) else {
            return Ok(true);
        };

        let Value::String(source) = guard else {
            return Err(QrActionError::script(ctx.rule_name, format!("{} 必须是正则字符串", WHEN_KEY)));
        };
        let regex = Regex::new(&source)
            .map_err(|e| QrActionError::script(ctx.rule_name, format!("{} 正则无效：{}", WHEN_KEY, e)))?;

        match regex.captures(ctx.qr_data) {
            Some(caps) => {
                captures.merge(ScanCaptures::from_regex(&regex, &caps));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl ScriptRuntime for TemplateScriptRuntime {
    fn run(&self, script: &str, ctx: &ScriptContext<'_>) -> QrResult<Option<Value>> {
        let body = script.trim();
        if body.is_empty() {
            return Err(QrActionError::script(ctx.rule_name, "脚本为空"));
        }

        let mut template: Value = serde_json::from_str(body)
            .map_err(|e| QrActionError::script(ctx.rule_name, format!("脚本解析失败：{}", e)))?;
        if template.is_null() {
            return Ok(None);
        }

        let mut captures = ctx.captures.clone();
        if !Self::apply_guard(&mut template, ctx, &mut captures)? {
            debug!("规则 '{}' 守卫未命中", ctx.rule_name);
            return Ok(None);
        }

        let rendered = render_value(template, &captures, ctx.qr_data);
        Ok((!rendered.is_null()).then_some(rendered))
    }
}
