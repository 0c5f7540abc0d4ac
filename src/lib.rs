//! qraction - MES前端扫码动作解析：规则匹配、结果归一化与页面效果分发

// 导出全局错误类型
pub use self::error::{QrActionError, QrResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    ActionType, QrActionRule, RuleDraft, RuleLibrary,
    RuleLoader, RuleCacheManager, RuleClient
};

// 导出编译模块核心接口
pub use self::compiler::{
    CompiledRule, CompiledRuleSet, RuleCompiler, AnchoredPattern
};

// 导出脚本模块核心接口
pub use self::script::{ScriptRuntime, ScriptContext, TemplateScriptRuntime};

// 导出效果模块核心接口
pub use self::effect::{RawEffect, CanonicalEffect, normalize};

// 导出解析模块核心接口
pub use self::resolver::{
    QrActionResolver, ActionResolver, RemoteResolver, ResolveOutcome
};

// 导出分发模块核心接口
pub use self::dispatcher::{
    PageContext, PageState, ScanDispatcher, DispatchOutcome, DefaultSetter, FallbackReason
};

// 导出摄像头模块核心接口
pub use self::camera::{CameraDevice, CameraSession, DecodeError, ScanController, ScanStep};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod script;
pub mod effect;
pub mod resolver;
pub mod dispatcher;
pub mod camera;

#[cfg(test)]
mod test_support;
