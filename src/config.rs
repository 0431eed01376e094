//! Gemini API 設定

use crate::error::{PanelError, Result};

/// デフォルトの抽出モデル
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// 出力を安定させるため低めの温度を使用
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// 大きなパネルスケジュールに対応するためのトークン上限
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 65536;

/// Gemini APIの接続設定
///
/// APIキーはクライアント生成時に明示的に渡す（プロセス全体の
/// 可変状態には置かない）。
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// 新しい設定を作成
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// 環境変数から設定を読み込む
    ///
    /// `GOOGLE_API_KEY` は必須、`GEMINI_MODEL` は省略時デフォルトモデル。
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            PanelError::Config("環境変数 GOOGLE_API_KEY が設定されていません".to_string())
        })?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_generation_defaults() {
        let config = GeminiConfig::new("key", "some-model");
        assert_eq!(config.model, "some-model");
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.max_output_tokens, 65536);
    }
}
