//! 扫码控制器：识别 → 解析 → 分发
//! 会话在识别成功时已同步关闭，因此同一会话同一时刻最多只有一个解析请求

use serde::Serialize;
use tracing::debug;

use super::session::{CameraDevice, CameraSession, DecodeError, DecodedScan, SessionEvent};
use crate::dispatcher::{DispatchOutcome, PageContext, ScanDispatcher};
use crate::resolver::QrActionResolver;

/// 单帧处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScanStep {
    /// 未识别到码，继续扫描
    Continue,
    /// 会话已关闭，结果被忽略
    Ignored,
    /// 识别失败，错误已显示在页面上
    Failed { message: String },
    /// 已完成解析与分发
    Dispatched { outcome: DispatchOutcome },
}

/// 扫码控制器
#[derive(Debug, Clone)]
pub struct ScanController<R> {
    resolver: R,
}

impl<R: QrActionResolver> ScanController<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// 处理单帧识别结果
    pub async fn handle_decode<D, C>(
        &self,
        session: &mut CameraSession<D, C>,
        decoded: Result<String, DecodeError>,
        page: &mut C,
    ) -> ScanStep
    where
        D: CameraDevice,
        C: PageContext,
    {
        match session.on_decode(decoded) {
            SessionEvent::Decoded(scan) => ScanStep::Dispatched {
                outcome: self.resolve_and_dispatch(scan, page).await,
            },
            SessionEvent::Continue => ScanStep::Continue,
            SessionEvent::Ignored => ScanStep::Ignored,
            SessionEvent::Failed(message) => {
                page.show_error(&message);
                ScanStep::Failed { message }
            }
        }
    }

    /// 解析已识别的文本并分发到页面；页面在解析期间关闭扫码界面不影响分发
    pub async fn resolve_and_dispatch<C: PageContext>(&self, scan: DecodedScan<C>, page: &mut C) -> DispatchOutcome {
        let DecodedScan { text, mut default_setter } = scan;
        let result = self.resolver.resolve(&text).await;
        let outcome = ScanDispatcher::dispatch(&text, &result, default_setter.as_deref_mut(), page);
        debug!("扫码 {} 分发完成：{:?}", text, outcome);
        outcome
    }
}
