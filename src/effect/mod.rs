//! 效果模块：解析结果的数据模型与归一化
pub mod model;
pub mod normalize;

pub use self::model::{RawEffect, ACTION_NAVIGATE, ACTION_UPDATE_FIELDS, ACTION_UPDATE_SEARCH};
pub use self::normalize::{normalize, CanonicalEffect};
