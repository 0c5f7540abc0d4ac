//! 摄像头模块：扫码会话的设备生命周期与识别结果的解析分发
pub mod session;
pub mod controller;

pub use self::session::{
    CameraDevice, CameraSession, DecodeError, DecodedScan, SessionEvent,
    CAMERA_START_FAILED_MESSAGE, DECODE_FAILED_MESSAGE,
};
pub use self::controller::{ScanController, ScanStep};
