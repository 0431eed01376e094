//! 処理パイプライン - 画像列の反復処理と結果の集約

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::csv_writer::CsvLog;
use crate::error::{PanelError, Result};
use crate::excel;
use crate::gemini::Extractor;
use crate::parser::{self, PanelRecord};

/// 一時的な障害の再試行回数
const MAX_RETRIES: u32 = 1;

/// 再試行までの待ち時間
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// 実行オプション
pub struct RunOptions {
    /// 出力ワークブックのパス
    pub output_path: PathBuf,
    /// 有効な場合、パネルごとに逐次追記する結合CSV
    pub csv_log: Option<CsvLog>,
}

/// 実行結果サマリー
#[derive(Debug, Default)]
pub struct RunSummary {
    /// ワークブックに書き込んだパネル数
    pub panels_written: usize,
    /// 正常に処理できた画像数（パネルなしを含む）
    pub images_processed: usize,
    /// パネルが見つからなかった画像数
    pub images_without_panels: usize,
    /// スキップした画像と理由
    pub skipped: Vec<(String, String)>,
}

impl RunSummary {
    pub fn images_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// 画像列を入力順に処理し、1つのワークブックを生成する
///
/// 画像単位の失敗（通信・解析）は警告してスキップし、実行全体は
/// 止めない。最後のワークブック書き込みの失敗のみ致命的。
/// 出力内のパネル順は入力順と一致する。
pub async fn run<E: Extractor>(
    extractor: &E,
    images: &[PathBuf],
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut all_panels: Vec<PanelRecord> = Vec::new();

    for (idx, image_path) in images.iter().enumerate() {
        let image_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        info!("処理中 ({}/{}): {}", idx + 1, images.len(), image_name);

        match process_image(extractor, image_path).await {
            Ok(panels) => {
                summary.images_processed += 1;
                if let Some(ref csv_log) = options.csv_log {
                    for panel in &panels {
                        if let Err(e) = csv_log.append_panel(panel, &image_name) {
                            warn!("CSVへの追記に失敗 ({}): {}", image_name, e);
                        }
                    }
                }
                info!("{} からパネル {} 件を抽出", image_name, panels.len());
                all_panels.extend(panels);
            }
            Err(PanelError::NoPanelDetected) => {
                // パネルが無いページは正常ケースとして情報ログのみ
                summary.images_processed += 1;
                summary.images_without_panels += 1;
                info!("{}: パネルスケジュールなし", image_name);
            }
            Err(e) => {
                warn!("{} をスキップ: {}", image_name, e);
                summary
                    .skipped
                    .push((image_name, skip_reason(&e).to_string()));
            }
        }
    }

    // 最終書き込みのみ致命的（途中の失敗は画像単位で封じ込め済み）
    excel::write_panels(&all_panels, &options.output_path)?;
    summary.panels_written = all_panels.len();
    Ok(summary)
}

/// 1枚の画像を抽出→解析する（一時的な障害は1回だけ再試行）
async fn process_image<E: Extractor>(
    extractor: &E,
    image_path: &Path,
) -> Result<Vec<PanelRecord>> {
    let bytes = std::fs::read(image_path)?;
    let mime_type = detect_mime_type(image_path, &bytes)?;

    let mut attempts = 0;
    let text = loop {
        match extractor.extract(&bytes, mime_type).await {
            Ok(text) => break text,
            Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                attempts += 1;
                warn!("一時的な障害のため再試行 ({}/{}): {}", attempts, MAX_RETRIES, e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    };

    parser::parse_panels(&text)
}

/// 画像バイト列からMIMEタイプを判定
fn detect_mime_type(path: &Path, bytes: &[u8]) -> Result<&'static str> {
    use image::ImageFormat;

    let format = image::guess_format(bytes)
        .map_err(|_| PanelError::UnsupportedImage(path.to_path_buf()))?;
    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Tiff => {
            Ok(format.to_mime_type())
        }
        _ => Err(PanelError::UnsupportedImage(path.to_path_buf())),
    }
}

/// サマリー表示用のスキップ理由
fn skip_reason(error: &PanelError) -> &'static str {
    match error {
        PanelError::Transport(_) | PanelError::RateLimited(_) | PanelError::Api { .. } => {
            "transport"
        }
        PanelError::MalformedResponse(_) => "parse",
        PanelError::Io(_) => "io",
        PanelError::UnsupportedImage(_) => "unsupported",
        _ => "other",
    }
}
