//! 扫码分发器核心：把解析结果转换为且仅转换为一个页面效果
use serde::Serialize;
use tracing::{debug, warn};

use super::page::PageContext;
use crate::effect::{normalize, CanonicalEffect, RawEffect};
use crate::error::QrResult;
use crate::resolver::ResolveOutcome;

/// 页面级错误信息前缀
pub const SCAN_ERROR_PREFIX: &str = "QRコード処理エラー: ";

/// 页面提供的兜底回调：未命中或结果无法应用时接收原始扫码文本
/// `'a` 为回调可借用的页面局部状态的生命周期；随扫码会话保存时为 `'static`
pub type DefaultSetter<'a, C> = dyn FnMut(&mut C, &str) + Send + 'a;

/// 走兜底逻辑的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// 无有效规则命中
    NotFound,
    /// 结果无法识别或缺少必需字段
    Unrecognized,
    /// 页面不支持该业务动作
    UnhandledDomain,
}

/// 单次分发的实际效果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Navigated { to: String },
    SearchUpdated { query: String },
    FieldsUpdated { applied: Vec<String>, ignored: Vec<String> },
    DomainHandled { kind: String },
    /// 已调用兜底回调
    DefaultApplied { reason: FallbackReason },
    /// 需要兜底但页面未提供回调
    NoEffect { reason: FallbackReason },
    ErrorReported { message: String },
}

/// 扫码分发器
pub struct ScanDispatcher;

impl ScanDispatcher {
    /// 分发解析结果
    ///
    /// - 解析失败：仅显示错误，不调用兜底回调，不修改字段；
    /// - 未命中：调用兜底回调（若有）；
    /// - 命中：按归一化后的效果执行一个分支，无法应用时回退到兜底回调。
    pub fn dispatch<C: PageContext>(
        qr_data: &str,
        result: &QrResult<ResolveOutcome>,
        default_setter: Option<&mut DefaultSetter<'_, C>>,
        ctx: &mut C,
    ) -> DispatchOutcome {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("{}{}", SCAN_ERROR_PREFIX, e);
                warn!("扫码解析失败：{}", e);
                ctx.show_error(&message);
                return DispatchOutcome::ErrorReported { message };
            }
        };

        let effect = match outcome {
            ResolveOutcome::NotFound => {
                return Self::fallback(qr_data, FallbackReason::NotFound, default_setter, ctx);
            }
            ResolveOutcome::Matched { result, .. } => normalize(&RawEffect::from(result.clone())),
        };

        Self::apply(qr_data, effect, default_setter, ctx)
    }

    /// 应用归一化后的效果
    pub fn apply<C: PageContext>(
        qr_data: &str,
        effect: CanonicalEffect,
        default_setter: Option<&mut DefaultSetter<'_, C>>,
        ctx: &mut C,
    ) -> DispatchOutcome {
        match effect {
            CanonicalEffect::Navigate { to, state } => {
                debug!("扫码结果：跳转 {}", to);
                ctx.navigate(&to, state.as_ref());
                DispatchOutcome::Navigated { to }
            }
            CanonicalEffect::UpdateSearch { query } => {
                debug!("扫码结果：更新检索条件 {}", query);
                ctx.update_search(&query);
                DispatchOutcome::SearchUpdated { query }
            }
            CanonicalEffect::UpdateFields { fields } => {
                let mut applied = Vec::new();
                let mut ignored = Vec::new();
                for (name, value) in fields {
                    if ctx.set_field(&name, &value) {
                        applied.push(name);
                    } else {
                        ignored.push(name);
                    }
                }
                if !ignored.is_empty() {
                    debug!("页面不识别的字段已忽略：{:?}", ignored);
                }
                DispatchOutcome::FieldsUpdated { applied, ignored }
            }
            CanonicalEffect::Domain { kind, payload } => {
                if ctx.handle_domain_action(&kind, &payload) {
                    debug!("扫码结果：业务动作 {}", kind);
                    DispatchOutcome::DomainHandled { kind }
                } else {
                    Self::fallback(qr_data, FallbackReason::UnhandledDomain, default_setter, ctx)
                }
            }
            CanonicalEffect::Unrecognized { action } => {
                debug!("扫码结果无法识别（action={:?}），回退到默认处理", action);
                Self::fallback(qr_data, FallbackReason::Unrecognized, default_setter, ctx)
            }
        }
    }

    fn fallback<C: PageContext>(
        qr_data: &str,
        reason: FallbackReason,
        default_setter: Option<&mut DefaultSetter<'_, C>>,
        ctx: &mut C,
    ) -> DispatchOutcome {
        match default_setter {
            Some(setter) => {
                setter(ctx, qr_data);
                DispatchOutcome::DefaultApplied { reason }
            }
            None => DispatchOutcome::NoEffect { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::page::PageState;
    use crate::error::QrActionError;
    use serde_json::{json, Value};

    fn transfer_page() -> PageState {
        PageState::new()
            .with_fields(["itemCode", "warehouse", "sourceLocation", "targetLocation"])
            .with_domain_actions(["location_transfer"])
    }

    fn matched(result: Value) -> QrResult<ResolveOutcome> {
        Ok(ResolveOutcome::matched("rule", result))
    }

    /// 调用 dispatch，兜底回调把文本写入 itemCode 并计数
    fn run(page: &mut PageState, qr_data: &str, result: &QrResult<ResolveOutcome>) -> (DispatchOutcome, Vec<String>) {
        let mut calls = Vec::new();
        let outcome = {
            let mut setter = |p: &mut PageState, text: &str| {
                p.set_field("itemCode", text);
                calls.push(text.to_string());
            };
            ScanDispatcher::dispatch(qr_data, result, Some(&mut setter), page)
        };
        (outcome, calls)
    }

    #[test]
    fn test_not_found_calls_default_setter_once() {
        let mut page = transfer_page();
        let (outcome, calls) = run(&mut page, "ITEM-001", &Ok(ResolveOutcome::NotFound));

        assert_eq!(outcome, DispatchOutcome::DefaultApplied { reason: FallbackReason::NotFound });
        assert_eq!(calls, vec!["ITEM-001".to_string()]);
        assert_eq!(page.field("itemCode"), Some("ITEM-001"));
        assert!(page.navigation.is_none());
        assert!(page.error.is_none());
    }

    #[test]
    fn test_default_setter_can_borrow_caller_state() {
        let mut page = transfer_page();
        let mut hits = 0usize;
        let mut last = String::new();
        {
            let mut setter = |_: &mut PageState, text: &str| {
                hits += 1;
                last = text.to_string();
            };
            for qr_data in ["ITEM-001", "ITEM-002"] {
                ScanDispatcher::dispatch(qr_data, &Ok(ResolveOutcome::NotFound), Some(&mut setter), &mut page);
            }
        }
        assert_eq!(hits, 2);
        assert_eq!(last, "ITEM-002");
    }

    #[test]
    fn test_not_found_without_setter_is_noop() {
        let mut page = transfer_page();
        let before = page.clone();
        let outcome = ScanDispatcher::dispatch("ITEM-001", &Ok(ResolveOutcome::NotFound), None, &mut page);
        assert_eq!(outcome, DispatchOutcome::NoEffect { reason: FallbackReason::NotFound });
        assert_eq!(page, before);
    }

    #[test]
    fn test_navigate_skips_default_setter() {
        let mut page = transfer_page();
        let result = matched(json!({"action": "navigate", "navigate": "/inventory", "state": {"part": "P-1"}, "updateSearch": "ignored"}));
        let (outcome, calls) = run(&mut page, "NAV", &result);

        assert_eq!(outcome, DispatchOutcome::Navigated { to: "/inventory".to_string() });
        assert!(calls.is_empty());
        let nav = page.navigation.unwrap();
        assert_eq!(nav.path, "/inventory");
        assert_eq!(nav.state, Some(json!({"part": "P-1"})));
        assert_eq!(page.search, "");
    }

    #[test]
    fn test_update_search_resets_page_index() {
        let mut page = transfer_page();
        page.page = 3;
        let (outcome, calls) = run(&mut page, "Q", &matched(json!({"action": "update_search", "updateSearch": "P-100"})));

        assert_eq!(outcome, DispatchOutcome::SearchUpdated { query: "P-100".to_string() });
        assert!(calls.is_empty());
        assert_eq!(page.search, "P-100");
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_location_scan_updates_fields() {
        let mut page = transfer_page();
        let result = matched(json!({
            "action": "update_fields",
            "updateFields": {"warehouse": "MAIN-WH", "sourceLocation": "A-01-01", "color": "red"}
        }));
        let (outcome, calls) = run(&mut page, "LOC:MAIN-WH:A-01-01", &result);

        assert_eq!(
            outcome,
            DispatchOutcome::FieldsUpdated {
                applied: vec!["sourceLocation".to_string(), "warehouse".to_string()],
                ignored: vec!["color".to_string()],
            }
        );
        assert!(calls.is_empty());
        assert_eq!(page.field("warehouse"), Some("MAIN-WH"));
        assert_eq!(page.field("sourceLocation"), Some("A-01-01"));
        assert!(page.field("color").is_none());
        assert!(page.error.is_none());
    }

    #[test]
    fn test_domain_action_opens_modal_or_falls_back() {
        let mut page = transfer_page();
        let payload = json!({"sourceLocation": "A-01", "warehouse": "W"});
        let (outcome, calls) = run(&mut page, "T", &matched(json!({"action": "location_transfer", "payload": payload})));
        assert_eq!(outcome, DispatchOutcome::DomainHandled { kind: "location_transfer".to_string() });
        assert!(calls.is_empty());
        assert_eq!(page.modal.as_ref().unwrap().payload, payload);

        let mut page = transfer_page();
        let (outcome, calls) = run(&mut page, "R", &matched(json!({"action": "goods_receipt", "payload": {"id": 1}})));
        assert_eq!(outcome, DispatchOutcome::DefaultApplied { reason: FallbackReason::UnhandledDomain });
        assert_eq!(calls, vec!["R".to_string()]);
        assert!(page.modal.is_none());
    }

    #[test]
    fn test_unrecognized_results_fall_back() {
        for result in [
            json!({"action": "teleport"}),
            json!({"action": "navigate"}),
            json!({"action": "update_search"}),
            json!({"action": "update_fields"}),
            json!({"action": "goods_receipt"}),
            json!("plain string"),
            json!({}),
        ] {
            let mut page = transfer_page();
            let (outcome, calls) = run(&mut page, "RAW-1", &matched(result.clone()));
            assert_eq!(
                outcome,
                DispatchOutcome::DefaultApplied { reason: FallbackReason::Unrecognized },
                "result {}",
                result
            );
            assert_eq!(calls, vec!["RAW-1".to_string()]);
        }
    }

    #[test]
    fn test_resolver_error_reports_only() {
        let mut page = transfer_page();
        let result: QrResult<ResolveOutcome> = Err(QrActionError::ResolverStatus {
            status: 500,
            message: "サーバーエラー: 500".to_string(),
        });
        let (outcome, calls) = run(&mut page, "X", &result);

        assert_eq!(
            outcome,
            DispatchOutcome::ErrorReported { message: "QRコード処理エラー: サーバーエラー: 500".to_string() }
        );
        assert!(calls.is_empty());
        assert_eq!(page.error.as_deref(), Some("QRコード処理エラー: サーバーエラー: 500"));
        assert_eq!(page.field("itemCode"), Some(""));
        assert!(page.navigation.is_none());
    }

    #[test]
    fn test_legacy_shape_matches_explicit_action() {
        let mut legacy = transfer_page();
        let mut explicit = transfer_page();
        let a = run(&mut legacy, "X", &matched(json!({"updateSearch": "X"})));
        let b = run(&mut explicit, "X", &matched(json!({"action": "update_search", "updateSearch": "X"})));
        assert_eq!(a, b);
        assert_eq!(legacy, explicit);
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let results = [
            Ok(ResolveOutcome::NotFound),
            matched(json!({"action": "navigate", "navigate": "/a"})),
            matched(json!({"action": "update_search", "updateSearch": "S"})),
            matched(json!({"action": "update_fields", "updateFields": {"warehouse": "W"}})),
            matched(json!({"action": "location_transfer", "payload": {"x": 1}})),
        ];
        for result in &results {
            let mut once = transfer_page();
            run(&mut once, "Q", result);
            let mut twice = once.clone();
            run(&mut twice, "Q", result);
            assert_eq!(once, twice);
        }
    }
}
