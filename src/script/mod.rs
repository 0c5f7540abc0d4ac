//! 脚本模块：规则脚本的执行引擎与结果模板渲染
pub mod template;
pub mod runtime;

pub use self::template::{render_str, render_value, ScanCaptures};
pub use self::runtime::{ScriptContext, ScriptRuntime, TemplateScriptRuntime};
