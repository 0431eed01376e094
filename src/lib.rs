//! パネルスケジュール抽出ツール - Google Gemini API を使用した電気図面データ抽出
//!
//! # 機能
//! - 電気図面の画像/PDFからGemini APIでパネルスケジュールを抽出
//! - パネルヘッダーと回路リスト（左側/右側）の構造化
//! - 整形済みExcelワークブックと結合CSVへの出力

pub mod config;
pub mod csv_writer;
pub mod error;
pub mod excel;
pub mod gemini;
pub mod parser;
pub mod paths;
pub mod pdf;
pub mod runner;

pub use error::PanelError;
pub use parser::{CircuitRow, PanelRecord};
