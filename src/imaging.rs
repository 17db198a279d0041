//! 画像の読み込み・切り出し・検出結果の可視化

use crate::error::{LabelCheckError, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use label_check_common::{Detection, Roi};
use std::path::{Path, PathBuf};

/// 可視化画像のファイル名接頭辞
pub const VISUALIZATION_PREFIX: &str = "check_labels_prediction_";

const PRIMARY_COLOR: Rgb<u8> = Rgb([255, 64, 0]);
const SECONDARY_COLOR: Rgb<u8> = Rgb([0, 160, 255]);
const BOX_THICKNESS: u32 = 3;

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| LabelCheckError::ImageLoad(format!("{}: {}", path.display(), e)))
}

/// 領域で切り出す（範囲は呼び出し側で画像内に収めておくこと）
pub fn crop(image: &DynamicImage, roi: &Roi) -> DynamicImage {
    image.crop_imm(roi.x, roi.y, roi.width, roi.height)
}

/// 全検出枠を描画した画像を作る（代表検出は別色）
pub fn draw_detections(
    image: &DynamicImage,
    detections: &[Detection],
    primary: Option<&Detection>,
) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (width, height) = canvas.dimensions();

    for detection in detections {
        let Some(roi) = Roi::from_bbox(&detection.bbox, width, height) else {
            continue;
        };
        let color = if primary.is_some_and(|p| std::ptr::eq(p, detection)) {
            PRIMARY_COLOR
        } else {
            SECONDARY_COLOR
        };

        // 内側に向かって太らせる
        for inset in 0..BOX_THICKNESS {
            if roi.width <= inset * 2 || roi.height <= inset * 2 {
                break;
            }
            let rect = Rect::at((roi.x + inset) as i32, (roi.y + inset) as i32)
                .of_size(roi.width - inset * 2, roi.height - inset * 2);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }

    canvas
}

pub fn visualization_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!("{}{}.png", VISUALIZATION_PREFIX, file_name))
}

pub fn save_visualization(dir: &Path, file_name: &str, canvas: &RgbImage) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = visualization_path(dir, file_name);
    canvas
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| LabelCheckError::Visualization(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}
