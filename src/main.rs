//! パネルスケジュール抽出ツール - メインエントリポイント

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use panel_extractor::config::GeminiConfig;
use panel_extractor::csv_writer::CsvLog;
use panel_extractor::gemini::GeminiClient;
use panel_extractor::runner::{self, RunOptions};
use panel_extractor::{paths, pdf};

/// 電気図面からパネルスケジュールを抽出してExcelに出力するツール
#[derive(Parser)]
#[command(name = "panel_extractor", version)]
#[command(about = "電気図面の画像/PDFからパネルスケジュールを抽出してExcelに出力")]
struct Cli {
    /// 入力 (PDFファイル、画像ファイル、または画像フォルダ)
    input: PathBuf,

    /// 出力Excelファイルのパス
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 使用するGeminiモデル (環境変数 GEMINI_MODEL より優先)
    #[arg(long)]
    model: Option<String>,

    /// 結合CSVも出力する (出力Excelと同名の.csv)
    #[arg(long)]
    csv: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ロギング初期化
    tracing_subscriber::fmt::init();

    // 環境変数の読み込み
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = GeminiConfig::from_env().context("Gemini APIの設定を読み込めません")?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    // 入力の収集（PDFはページごとにラスタライズ）
    let (images, temp_pages) = collect_inputs(&cli.input)?;
    if images.is_empty() {
        bail!("入力が見つかりません: {}", cli.input.display());
    }
    info!("{} 件の画像を処理します", images.len());

    let output_path = cli.output.unwrap_or_else(paths::default_output_path);
    let csv_log = cli
        .csv
        .then(|| CsvLog::new(output_path.with_extension("csv")));
    let options = RunOptions {
        output_path: output_path.clone(),
        csv_log,
    };

    let client = GeminiClient::new(config);
    let result = runner::run(&client, &images, &options).await;

    // PDF由来の一時画像を先に片付けてから結果を処理する
    if let Some(ref pages) = temp_pages {
        pdf::cleanup(pages);
    }

    let summary = result
        .with_context(|| format!("出力の書き込みに失敗: {}", output_path.display()))?;

    info!(
        "完了: パネル {} 件を {} に書き込みました",
        summary.panels_written,
        output_path.display()
    );
    if summary.images_without_panels > 0 {
        info!(
            "パネルが見つからなかった画像: {} 件",
            summary.images_without_panels
        );
    }
    if !summary.skipped.is_empty() {
        info!("スキップした画像: {} 件", summary.images_skipped());
        for (name, reason) in &summary.skipped {
            info!("  {} ({})", name, reason);
        }
    }

    Ok(())
}

/// 入力パスから処理対象の画像リストを作る
///
/// 戻り値の2番目は後で削除すべきPDF由来の一時画像。
fn collect_inputs(input: &Path) -> Result<(Vec<PathBuf>, Option<Vec<PathBuf>>)> {
    if !input.exists() {
        bail!("入力が見つかりません: {}", input.display());
    }
    if input.is_dir() {
        return Ok((paths::collect_images(input)?, None));
    }
    if input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    {
        if !pdf::is_pdftoppm_available() {
            bail!("pdftoppmが見つかりません (Popplerをインストールしてください)");
        }
        let pages = pdf::rasterize(input)?;
        return Ok((pages.clone(), Some(pages)));
    }
    if paths::is_supported_image(input) {
        return Ok((vec![input.to_path_buf()], None));
    }
    bail!("対応していない入力形式: {}", input.display())
}
