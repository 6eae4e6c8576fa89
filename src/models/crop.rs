use serde::{Deserialize, Serialize};

/// 裁剪区域，单位为像素
///
/// `POST /utils/auto-crop` 返回的就是原图坐标下的这个结构
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
