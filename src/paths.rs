//! 入出力パスの規約

use std::path::{Path, PathBuf};

use crate::error::Result;

/// 対応しているラスタ画像の拡張子
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// デフォルトの出力フォルダ
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// デフォルトの出力ファイル名
pub const DEFAULT_OUTPUT_FILENAME: &str = "panel_schedules.xlsx";

/// 拡張子が対応画像かどうか
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// フォルダ内の対応画像をファイル名順に収集
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();
    images.sort();
    Ok(images)
}

/// デフォルトの出力パス (output/panel_schedules.xlsx)
pub fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(DEFAULT_OUTPUT_FILENAME)
}
