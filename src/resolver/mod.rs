//! 解析模块：扫码文本 → 规则求值结果
pub mod outcome;
pub mod local;
pub mod remote;

use std::sync::Arc;
use async_trait::async_trait;

use crate::error::{QrActionError, QrResult};

pub use self::outcome::ResolveOutcome;
pub use self::local::ActionResolver;
pub use self::remote::RemoteResolver;

/// 动作解析器：本地求值与远程调用共用同一契约
#[async_trait]
pub trait QrActionResolver: Send + Sync {
    /// 解析扫码文本：命中返回 `Matched`，无规则命中返回 `NotFound`，其余情况返回错误
    async fn resolve(&self, qr_data: &str) -> QrResult<ResolveOutcome>;
}

#[async_trait]
impl<T: QrActionResolver + ?Sized> QrActionResolver for Arc<T> {
    async fn resolve(&self, qr_data: &str) -> QrResult<ResolveOutcome> {
        (**self).resolve(qr_data).await
    }
}

/// 空扫码文本不参与解析；仅含空白的文本照常求值
pub(crate) fn validate_qr_data(qr_data: &str) -> QrResult<()> {
    if qr_data.is_empty() {
        return Err(QrActionError::InvalidInput("qr_data is required.".to_string()));
    }
    Ok(())
}
