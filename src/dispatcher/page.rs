//! 页面上下文：分发器对页面状态的全部操作都经由此接口

use std::collections::{BTreeMap, BTreeSet};
use serde::Serialize;
use serde_json::Value;

/// 页面上下文
pub trait PageContext {
    /// 页面跳转，`state` 原样转交目标页面
    fn navigate(&mut self, to: &str, state: Option<&Value>);

    /// 覆盖检索条件并把页码重置为第 1 页
    fn update_search(&mut self, query: &str);

    /// 覆盖指定表单字段；页面不认识该字段时返回 false 且不做任何修改
    fn set_field(&mut self, name: &str, value: &str) -> bool;

    /// 处理业务动作（如打开预填写的入库弹窗）；页面不支持时返回 false
    fn handle_domain_action(&mut self, kind: &str, payload: &Value) -> bool;

    /// 显示页面级错误信息
    fn show_error(&mut self, message: &str);
}

/// 页面跳转记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    pub path: String,
    pub state: Option<Value>,
}

/// 业务弹窗状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainModal {
    pub kind: String,
    pub payload: Value,
}

/// 通用页面状态模型：检索条件、分页、表单字段、跳转、错误提示与业务弹窗
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState {
    pub search: String,
    pub page: u32,
    pub fields: BTreeMap<String, String>,
    pub navigation: Option<Navigation>,
    pub error: Option<String>,
    pub modal: Option<DomainModal>,
    #[serde(skip)]
    domain_actions: BTreeSet<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            fields: BTreeMap::new(),
            navigation: None,
            error: None,
            modal: None,
            domain_actions: BTreeSet::new(),
        }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明页面表单字段（初始为空）
    pub fn with_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.fields.entry(name.into()).or_default();
        }
        self
    }

    /// 声明页面支持的业务动作
    pub fn with_domain_actions<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_actions.extend(kinds.into_iter().map(Into::into));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.domain_actions.contains(kind)
    }
}

impl PageContext for PageState {
    fn navigate(&mut self, to: &str, state: Option<&Value>) {
        self.navigation = Some(Navigation {
            path: to.to_string(),
            state: state.cloned(),
        });
    }

    fn update_search(&mut self, query: &str) {
        self.search = query.to_string();
        self.page = 1;
    }

    fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    fn handle_domain_action(&mut self, kind: &str, payload: &Value) -> bool {
        if !self.supports(kind) {
            return false;
        }
        self.modal = Some(DomainModal {
            kind: kind.to_string(),
            payload: payload.clone(),
        });
        true
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}
