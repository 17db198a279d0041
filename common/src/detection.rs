//! ラベル検出結果の型とパーサー
//!
//! 検出器プロセスは1画像につき1行のJSONを返す:
//! `{"detections":[{"bbox":[x1,y1,x2,y2],"score":0.97,"class":"label"}]}`
//! 失敗時は `{"error":"..."}`。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 検出された1領域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// [x1, y1, x2, y2]（画像座標、浮動小数）
    pub bbox: [f64; 4],

    #[serde(default)]
    pub score: f64,

    #[serde(default, rename = "class")]
    pub class_name: String,
}

#[derive(Debug, Deserialize)]
struct DetectorResponse {
    #[serde(default)]
    detections: Vec<Detection>,
    #[serde(default)]
    error: Option<String>,
}

/// 検出器の応答行をパース
pub fn parse_detector_response(line: &str) -> Result<Vec<Detection>> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Error::Parse("検出器の応答が空です".into()));
    }

    let response: DetectorResponse = serde_json::from_str(line)
        .map_err(|e| Error::Parse(format!("検出器応答のJSONパースエラー: {}", e)))?;

    if let Some(message) = response.error {
        return Err(Error::Detector(message));
    }

    Ok(response.detections)
}

/// 代表検出を選ぶ（最高スコア、同点は先頭側）
pub fn select_primary(detections: &[Detection]) -> Option<&Detection> {
    detections.iter().fold(None, |best: Option<&Detection>, d| match best {
        Some(b) if d.score <= b.score => Some(b),
        _ => Some(d),
    })
}

/// 整数化した切り出し領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// バウンディングボックスを丸めて画像範囲内に収める
    ///
    /// 座標は偶数丸め。範囲外は画像端に切り詰める。面積が0になる場合は None。
    pub fn from_bbox(bbox: &[f64; 4], image_width: u32, image_height: u32) -> Option<Self> {
        let clamp = |v: f64, max: u32| -> u32 {
            let v = v.round_ties_even();
            if v.is_nan() || v <= 0.0 {
                0
            } else if v >= max as f64 {
                max
            } else {
                v as u32
            }
        };

        let x1 = clamp(bbox[0], image_width);
        let y1 = clamp(bbox[1], image_height);
        let x2 = clamp(bbox[2], image_width);
        let y2 = clamp(bbox[3], image_height);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }

    pub fn x2(&self) -> u32 {
        self.x + self.width
    }

    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
