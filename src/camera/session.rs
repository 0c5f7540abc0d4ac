//! 摄像头扫码会话
//! 会话独占摄像头设备句柄：成功识别、主动关闭、致命错误与析构任一路径都会释放设备，且只释放一次

use std::fmt;
use tracing::{debug, warn};

use crate::dispatcher::DefaultSetter;
use crate::error::{QrActionError, QrResult};

/// 识别失败提示
pub const DECODE_FAILED_MESSAGE: &str = "バーコードの読み取りに失敗しました。";
/// 摄像头启动失败提示
pub const CAMERA_START_FAILED_MESSAGE: &str = "カメラの起動に失敗しました。";

/// 摄像头设备
pub trait CameraDevice: Send {
    /// 启动视频流
    fn start(&mut self) -> Result<(), String>;
    /// 停止视频流并释放设备
    fn stop(&mut self);
}

/// 单帧识别错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// 画面中没有可识别的码（连续扫码时的常态）
    NotFound,
    /// 设备或解码器故障
    Fatal(String),
}

/// 成功识别的扫码，携带发起扫码页面的兜底回调
pub struct DecodedScan<C> {
    pub text: String,
    pub default_setter: Option<Box<DefaultSetter<'static, C>>>,
}

impl<C> fmt::Debug for DecodedScan<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedScan")
            .field("text", &self.text)
            .field("default_setter", &self.default_setter.is_some())
            .finish()
    }
}

/// 会话对单帧识别结果的处理
#[derive(Debug)]
pub enum SessionEvent<C> {
    /// 识别成功，会话已关闭
    Decoded(DecodedScan<C>),
    /// 未识别到码，会话继续
    Continue,
    /// 致命错误，会话已关闭
    Failed(String),
    /// 会话已关闭，忽略迟到的识别结果
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    Closed,
}

/// 扫码会话
pub struct CameraSession<D: CameraDevice, C> {
    device: D,
    state: SessionState,
    default_setter: Option<Box<DefaultSetter<'static, C>>>,
}

impl<D: CameraDevice, C> CameraSession<D, C> {
    /// 打开会话并启动设备；启动失败时不持有设备
    pub fn open(mut device: D, default_setter: Option<Box<DefaultSetter<'static, C>>>) -> QrResult<Self> {
        if let Err(e) = device.start() {
            warn!("摄像头启动失败：{}", e);
            return Err(QrActionError::CameraError(CAMERA_START_FAILED_MESSAGE.to_string()));
        }
        debug!("扫码会话已打开");
        Ok(Self {
            device,
            state: SessionState::Open,
            default_setter,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// 处理单帧识别结果；成功识别时先同步停止设备，再把文本交给调用方
    pub fn on_decode(&mut self, decoded: Result<String, DecodeError>) -> SessionEvent<C> {
        if !self.is_open() {
            return SessionEvent::Ignored;
        }

        match decoded {
            Ok(text) if text.trim().is_empty() => SessionEvent::Continue,
            Ok(text) => {
                self.release();
                debug!("扫码识别成功：{}", text);
                SessionEvent::Decoded(DecodedScan {
                    text,
                    default_setter: self.default_setter.take(),
                })
            }
            Err(DecodeError::NotFound) => SessionEvent::Continue,
            Err(DecodeError::Fatal(e)) => {
                warn!("扫码识别失败：{}", e);
                self.release();
                SessionEvent::Failed(DECODE_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// 主动关闭会话
    pub fn close(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.state == SessionState::Open {
            self.state = SessionState::Closed;
            self.device.stop();
            debug!("扫码会话已关闭，设备已释放");
        }
    }
}

impl<D: CameraDevice, C> Drop for CameraSession<D, C> {
    fn drop(&mut self) {
        self.release();
    }
}
