//! PDF処理モジュール - PDFから画像への変換

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PanelError, Result};

/// ラスタライズ解像度 (DPI)
const RASTER_DPI: &str = "300";

/// pdftoppmが利用可能かチェック
pub fn is_pdftoppm_available() -> bool {
    Command::new("pdftoppm").arg("-v").output().is_ok()
}

/// PDFの全ページをPNG画像に変換し、ページ順のパスを返す
pub fn rasterize(pdf_path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let pdf_path = pdf_path.as_ref();

    // 実行ごとの一時ディレクトリを作成
    let temp_dir = std::env::temp_dir().join(format!(
        "panel_extractor_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    ));
    std::fs::create_dir_all(&temp_dir)?;
    let output_base = temp_dir.join("page");

    let output = Command::new("pdftoppm")
        .args(["-png", "-r", RASTER_DPI])
        .arg(pdf_path)
        .arg(&output_base)
        .output()
        .map_err(|e| PanelError::Pdf(format!("pdftoppmの実行に失敗: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PanelError::Pdf(format!("PDF変換に失敗: {}", stderr)));
    }

    // page-1.png / page-01.png 両方のパターンがあるためページ番号でソート
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(&temp_dir)? {
        let path = entry?.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }
    if pages.is_empty() {
        return Err(PanelError::Pdf(
            "変換された画像ファイルが見つかりません".to_string(),
        ));
    }
    pages.sort_by_key(|(number, _)| *number);

    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// pdftoppmの出力ファイル名からページ番号を取り出す
fn page_number(path: &Path) -> Option<u32> {
    if !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
    {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

/// 変換した一時画像をディレクトリごとクリーンアップ
pub fn cleanup(pages: &[PathBuf]) {
    if let Some(parent) = pages.first().and_then(|p| p.parent()) {
        let _ = std::fs::remove_dir_all(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_handles_zero_padding() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-01.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-12.png")), Some(12));
    }

    #[test]
    fn page_number_rejects_other_files() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.txt")), None);
        assert_eq!(page_number(Path::new("/tmp/x/cover.png")), None);
        assert_eq!(page_number(Path::new("/tmp/x/page-abc.png")), None);
    }
}
