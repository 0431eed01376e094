//! レスポンス整形 - フェンス除去・JSON修復・キー揺れの吸収

use regex::Regex;
use serde_json::{Map, Value};

use super::{CircuitRow, PanelRecord};

/// markdownコードフェンス (```json ... ```) を除去
pub(super) fn strip_code_fences(text: &str) -> &str {
    let mut stripped = text.trim();
    if let Some(rest) = stripped.strip_prefix("```json") {
        stripped = rest;
    } else if let Some(rest) = stripped.strip_prefix("```") {
        stripped = rest;
    }
    if let Some(rest) = stripped.strip_suffix("```") {
        stripped = rest;
    }
    stripped.trim()
}

/// 「パネルなし」を文章で回答してきたかどうか
pub(super) fn mentions_no_panel(text: &str) -> bool {
    if let Ok(re) = Regex::new(r"(?i)\bno\s+panel") {
        re.is_match(text)
    } else {
        false
    }
}

/// 途中で切れたJSONの修復を試みる
///
/// 最後に完結した値まで切り詰め、文字列リテラル外の
/// 開き括弧を数えて逆順に閉じる。修復できない場合はNone。
pub(super) fn repair_truncated_json(text: &str) -> Option<String> {
    let cut = text.rfind(|c: char| c == '}' || c == ']')?;
    let mut repaired = text[..=cut].trim_end().trim_end_matches(',').to_string();

    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in repaired.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }
    if in_string {
        return None;
    }

    while let Some(close) = stack.pop() {
        repaired.push(close);
    }
    Some(repaired)
}

/// エラーメッセージ用にレスポンスの先頭部分を切り出す
pub(super) fn excerpt(text: &str) -> String {
    const MAX_LEN: usize = 120;
    if text.chars().count() <= MAX_LEN {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_LEN).collect();
        format!("{}...", head)
    }
}

/// キーの揺れ ("Panel Name" / panel_name / panelName) を吸収した検索
pub(super) fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let target = normalize_key(name);
    obj.iter()
        .find(|(key, _)| normalize_key(key) == target)
        .map(|(_, value)| value)
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// 1パネル分のJSON値をレコードに変換
pub(super) fn panel_record(value: &Value) -> Option<PanelRecord> {
    let obj = value.as_object()?;
    // ヘッダーがネストされていない場合はパネルオブジェクト自体から探す
    let header = field(obj, "panel_header")
        .or_else(|| field(obj, "header"))
        .and_then(Value::as_object)
        .unwrap_or(obj);

    let mut record = PanelRecord {
        name: string_field(header, &["panel_name", "name", "designation"]),
        main_rating: string_field(header, &["main_rating", "main"]),
        voltage: string_field(header, &["voltage"]),
        phase: string_field(header, &["phase"]),
        wire: string_field(header, &["wire"]),
        poles: poles_field(header, &["poles", "number_of_poles"], 0),
        kaic: string_field(header, &["kaic", "kaic_rating", "aic"]),
        enclosure: string_field(header, &["enclosure", "enclosure_type"]),
        ..PanelRecord::default()
    };

    let left = field(obj, "left_circuits").and_then(Value::as_array);
    let right = field(obj, "right_circuits").and_then(Value::as_array);
    if left.is_none() && right.is_none() {
        // 左右の区別がないレスポンスはすべて左側として扱う
        if let Some(all) = field(obj, "circuits").and_then(Value::as_array) {
            record.left_circuits = all.iter().filter_map(circuit_row).collect();
        }
    } else {
        record.left_circuits = left
            .map(|rows| rows.iter().filter_map(circuit_row).collect())
            .unwrap_or_default();
        record.right_circuits = right
            .map(|rows| rows.iter().filter_map(circuit_row).collect())
            .unwrap_or_default();
    }

    Some(record)
}

/// 1回路分のJSON値を行に変換（全フィールド空の行は捨てる）
fn circuit_row(value: &Value) -> Option<CircuitRow> {
    let obj = value.as_object()?;
    let row = CircuitRow {
        circuit_number: optional_field(obj, &["circuit_number", "circuit_no", "circuit"]),
        load_description: string_field(obj, &["load_description", "load", "description"]),
        protection_size: string_field(
            obj,
            &["ocp_size", "protection_size", "overcurrent_protection_size", "breaker_size"],
        ),
        poles: poles_field(obj, &["poles"], 1),
        feeder: optional_field(obj, &["feeder", "feeder_size", "wire_size"]),
    };

    if row.load_description.is_empty()
        && row.protection_size.is_empty()
        && row.circuit_number.is_none()
    {
        return None;
    }
    Some(row)
}

/// 候補キーを順に探し、最初の空でない文字列値を返す
fn string_field(obj: &Map<String, Value>, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| field(obj, name))
        .map(value_to_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn optional_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    let value = string_field(obj, names);
    (!value.is_empty()).then_some(value)
}

/// 極数を取り出す（数値・数字入り文字列の両方を許容）
fn poles_field(obj: &Map<String, Value>, names: &[&str], default: u32) -> u32 {
    for name in names {
        let Some(value) = field(obj, name) else {
            continue;
        };
        if let Some(n) = value.as_u64() {
            return n as u32;
        }
        if let Some(s) = value.as_str() {
            if let Ok(re) = Regex::new(r"\d+") {
                if let Some(m) = re.find(s) {
                    if let Ok(n) = m.as_str().parse() {
                        return n;
                    }
                }
            }
        }
    }
    default
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_variants() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn repair_closes_open_brackets() {
        let repaired = repair_truncated_json(r#"{"panels":[{"a":[1,2]"#).unwrap();
        assert_eq!(repaired, r#"{"panels":[{"a":[1,2]}]}"#);
        serde_json::from_str::<Value>(&repaired).unwrap();
    }

    #[test]
    fn repair_drops_trailing_comma() {
        let repaired = repair_truncated_json(r#"{"panels":[{"a":1},"#).unwrap();
        serde_json::from_str::<Value>(&repaired).unwrap();
    }

    #[test]
    fn repair_gives_up_without_any_closer() {
        assert!(repair_truncated_json(r#"{"panels":[{"a":"#).is_none());
    }

    #[test]
    fn field_lookup_ignores_case_and_separators() {
        let value: Value =
            serde_json::from_str(r#"{"Panel Name":"LP-1","mainRating":"100A"}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(field(obj, "panel_name").and_then(Value::as_str), Some("LP-1"));
        assert_eq!(field(obj, "main_rating").and_then(Value::as_str), Some("100A"));
    }

    #[test]
    fn poles_accepts_numbers_and_strings() {
        let value: Value =
            serde_json::from_str(r#"{"a":{"poles":3},"b":{"poles":"2P"},"c":{"poles":""}}"#)
                .unwrap();
        let obj = value.as_object().unwrap();
        let sub = |key: &str| obj[key].as_object().unwrap();
        assert_eq!(poles_field(sub("a"), &["poles"], 1), 3);
        assert_eq!(poles_field(sub("b"), &["poles"], 1), 2);
        assert_eq!(poles_field(sub("c"), &["poles"], 1), 1);
    }
}
