//! レスポンス解析モジュール - パネルスケジュール情報の抽出

mod response;

use crate::error::{PanelError, Result};

/// 抽出された1面のパネルスケジュール
///
/// 解析後は不変。書き込みまでオーケストレーターが単独所有する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelRecord {
    /// パネル名 (AP-1, PC-LP-01-01 など)
    pub name: String,
    /// 主幹定格 (100A MLO, 400A MCB など)
    pub main_rating: String,
    /// 電圧 (208Y/120 など)
    pub voltage: String,
    /// 相数
    pub phase: String,
    /// 線式
    pub wire: String,
    /// 極数 (不明な場合は0)
    pub poles: u32,
    /// 短絡遮断容量 (22KAIC など)
    pub kaic: String,
    /// 筐体タイプ (NEMA1 など)
    pub enclosure: String,
    /// 左側の回路（図面上の上から下の順）
    pub left_circuits: Vec<CircuitRow>,
    /// 右側の回路（図面上の上から下の順）
    pub right_circuits: Vec<CircuitRow>,
}

/// 回路1行分
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircuitRow {
    /// 回路番号 ("1", "1-3" など。図面に無ければNone)
    pub circuit_number: Option<String>,
    /// 負荷の説明
    pub load_description: String,
    /// 過電流保護の定格 (20A など)
    pub protection_size: String,
    /// 極数
    pub poles: u32,
    /// ケーブルサイズ等（図面に無ければNone）
    pub feeder: Option<String>,
}

impl PanelRecord {
    /// ヘッダー情報を1行の説明文字列にまとめる
    ///
    /// 固定順: 名称, 主幹定格, 電圧, 相数, 線式, 極数, KAIC, 筐体。
    /// 空のフィールドは省略する。
    pub fn description(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.name.is_empty() {
            parts.push(format!("Panel {}", self.name));
        }
        for field in [&self.main_rating, &self.voltage, &self.phase, &self.wire] {
            if !field.is_empty() {
                parts.push((*field).clone());
            }
        }
        if self.poles > 0 {
            parts.push(format!("{} poles", self.poles));
        }
        for field in [&self.kaic, &self.enclosure] {
            if !field.is_empty() {
                parts.push((*field).clone());
            }
        }

        parts.join(", ")
    }

    /// 回路行の総数（左右合計）
    pub fn circuit_count(&self) -> usize {
        self.left_circuits.len() + self.right_circuits.len()
    }

    /// すべての回路を出力順（左側→右側）で返す
    pub fn circuits(&self) -> impl Iterator<Item = &CircuitRow> {
        self.left_circuits.iter().chain(self.right_circuits.iter())
    }
}

/// レスポンステキストからパネルレコード群を解析
///
/// レスポンスは信頼できない外部入力として扱う:
/// - markdownコードフェンスを除去
/// - 途中で切れたJSONは括弧を閉じて修復を試みる
/// - キーの大文字小文字・区切り文字の揺れを許容
/// - 左右の区別がない回路リストはすべて左側として扱う
pub fn parse_panels(text: &str) -> Result<Vec<PanelRecord>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PanelError::MalformedResponse("空のレスポンス".to_string()));
    }

    let cleaned = response::strip_code_fences(trimmed);

    let root: serde_json::Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(_) => {
            // JSONでない場合、「パネルなし」の文章回答なら正常ケース
            if response::mentions_no_panel(cleaned) {
                return Err(PanelError::NoPanelDetected);
            }
            // 大きなレスポンスは途中で切れることがあるため修復を試みる
            match response::repair_truncated_json(cleaned)
                .and_then(|repaired| serde_json::from_str(&repaired).ok())
            {
                Some(value) => value,
                None => {
                    return Err(PanelError::MalformedResponse(response::excerpt(cleaned)));
                }
            }
        }
    };

    let obj = match root.as_object() {
        Some(obj) => obj,
        None => {
            // JSON文字列で「パネルなし」と答えてくるモデルもある
            if root.as_str().is_some_and(response::mentions_no_panel) {
                return Err(PanelError::NoPanelDetected);
            }
            return Err(PanelError::MalformedResponse(
                "JSONオブジェクトではありません".to_string(),
            ));
        }
    };
    let panels = response::field(obj, "panels")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            PanelError::MalformedResponse("panelsフィールドがありません".to_string())
        })?;

    if panels.is_empty() {
        return Err(PanelError::NoPanelDetected);
    }

    // 回路が1件も無いパネルは有効なレコードとして扱わない
    let records: Vec<PanelRecord> = panels
        .iter()
        .filter_map(response::panel_record)
        .filter(|record| record.circuit_count() > 0)
        .collect();

    if records.is_empty() {
        return Err(PanelError::MalformedResponse(
            "回路行を1件も復元できませんでした".to_string(),
        ));
    }

    Ok(records)
}
