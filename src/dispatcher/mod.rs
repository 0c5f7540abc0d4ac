//! 分发模块：解析结果 → 页面效果
pub mod page;
pub mod dispatcher;

pub use self::page::{DomainModal, Navigation, PageContext, PageState};
pub use self::dispatcher::{DefaultSetter, DispatchOutcome, FallbackReason, ScanDispatcher, SCAN_ERROR_PREFIX};
