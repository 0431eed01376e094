//! エラー型定義

use std::path::PathBuf;

use thiserror::Error;

/// パイプライン共通のエラー種別
///
/// オーケストレーターはこの種別を見て「再試行」「画像単位でスキップ」
/// 「実行全体を中断」のいずれかを判断する。
#[derive(Debug, Error)]
pub enum PanelError {
    /// ネットワーク/送信エラー（一時的、再試行可能）
    #[error("Gemini APIへの接続に失敗: {0}")]
    Transport(#[source] reqwest::Error),

    /// レート制限（一時的、再試行可能）
    #[error("Gemini APIがレート制限中 (HTTP {0})")]
    RateLimited(u16),

    /// その他のAPIエラー
    #[error("Gemini APIエラー (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// レスポンスからヘッダー+回路を復元できない（再試行不可、警告してスキップ）
    #[error("レスポンスを解析できません: {0}")]
    MalformedResponse(String),

    /// パネルスケジュールが存在しないと明示されたレスポンス（正常ケース）
    #[error("パネルスケジュールが検出されませんでした")]
    NoPanelDetected,

    /// 対応していない画像形式
    #[error("対応していない画像形式: {0}")]
    UnsupportedImage(PathBuf),

    /// PDFのラスタライズ失敗
    #[error("PDF変換に失敗: {0}")]
    Pdf(String),

    /// 設定エラー（APIキー欠落など）
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入出力エラー")]
    Io(#[from] std::io::Error),

    #[error("Excel書き込みに失敗")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV書き込みに失敗")]
    Csv(#[from] csv::Error),
}

impl PanelError {
    /// 一時的な障害かどうか（再試行の判断に使用）
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
