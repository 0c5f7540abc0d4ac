//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum QrActionError {
    // 规则相关错误
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),
    #[error("规则缓存失败：{0}")]
    RuleCacheError(String),
    #[error("规则解析失败：{0}")]
    RuleParseError(String),

    // 编译 / 执行相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),
    #[error("动作 '{rule}' 脚本执行失败：{message}")]
    ScriptError { rule: String, message: String },

    // 解析服务相关错误
    #[error("{message}")]
    ResolverStatus { status: u16, message: String },
    #[error("解析结果格式错误：{0}")]
    MalformedResponse(String),

    // 摄像头相关错误
    #[error("{0}")]
    CameraError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("{0}")]
    InvalidInput(String),
}

impl QrActionError {
    /// 构造脚本执行错误
    pub fn script(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScriptError {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

// 全局Result类型
pub type QrResult<T> = Result<T, QrActionError>;
