//! Gemini API クライアントモジュール

mod client;
mod prompt;

pub use client::GeminiClient;
pub use prompt::EXTRACTION_PROMPT;

use async_trait::async_trait;

use crate::error::Result;

/// 画像からの構造化抽出を行うインターフェース
///
/// 実装: `GeminiClient`。テストではスタブ実装に差し替える。
#[async_trait]
pub trait Extractor: Send + Sync {
    /// 画像と抽出プロンプトをAPIに送信し、レスポンステキストを返す
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<String>;
}
