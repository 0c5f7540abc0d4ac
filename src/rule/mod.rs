//! 规则模块：负责规则的加载、缓存、管理与数据模型定义
pub mod model;
pub mod cache;
pub mod client;
pub mod loader;

// 导出核心接口
pub use self::model::{ActionType, QrActionRule, RuleDraft, RuleLibrary};
pub use self::loader::RuleLoader;
pub use self::cache::RuleCacheManager;
pub use self::client::RuleClient;
