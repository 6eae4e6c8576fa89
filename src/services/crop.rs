//! 裁剪区域换算
//!
//! 在缩放显示的图片上框选的区域要换算回原图像素；后端自动裁剪的结果要限制在图片内

use crate::error::{AppResult, ValidationError};
use crate::models::CropRect;

/// 图片尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

/// 把显示尺寸下的裁剪框换算到原图尺寸
pub fn scale_to_natural(crop: CropRect, displayed: ImageSize, natural: ImageSize) -> AppResult<CropRect> {
    if displayed.width <= 0.0 || displayed.height <= 0.0 {
        return Err(invalid(displayed.width, displayed.height));
    }
    let scale_x = natural.width / displayed.width;
    let scale_y = natural.height / displayed.height;
    Ok(CropRect {
        x: crop.x * scale_x,
        y: crop.y * scale_y,
        width: crop.width * scale_x,
        height: crop.height * scale_y,
    })
}

/// 限制裁剪框在图片范围内，宽或高不为正时报错
pub fn clamp_to(crop: CropRect, bounds: ImageSize) -> AppResult<CropRect> {
    let x = crop.x.clamp(0.0, bounds.width);
    let y = crop.y.clamp(0.0, bounds.height);
    let right = (crop.x + crop.width).clamp(0.0, bounds.width);
    let bottom = (crop.y + crop.height).clamp(0.0, bounds.height);

    let width = right - x;
    let height = bottom - y;
    if width <= 0.0 || height <= 0.0 {
        return Err(invalid(width, height));
    }
    Ok(CropRect { x, y, width, height })
}

fn invalid(width: f64, height: f64) -> crate::error::AppError {
    ValidationError::InvalidCrop {
        width: width.round() as i64,
        height: height.round() as i64,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_display_crop_to_natural_pixels() {
        let crop = CropRect { x: 10.0, y: 20.0, width: 100.0, height: 50.0 };
        let natural = scale_to_natural(
            crop,
            ImageSize { width: 400.0, height: 300.0 },
            ImageSize { width: 1600.0, height: 1200.0 },
        )
        .unwrap();
        assert_eq!(natural, CropRect { x: 40.0, y: 80.0, width: 400.0, height: 200.0 });
    }

    #[test]
    fn test_clamp_auto_crop_box() {
        let bounds = ImageSize { width: 800.0, height: 600.0 };
        let clamped = clamp_to(CropRect { x: -5.0, y: 500.0, width: 900.0, height: 200.0 }, bounds).unwrap();
        assert_eq!(clamped, CropRect { x: 0.0, y: 500.0, width: 800.0, height: 100.0 });

        assert!(clamp_to(CropRect { x: 900.0, y: 0.0, width: 10.0, height: 10.0 }, bounds).is_err());
    }
}
