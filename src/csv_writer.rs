//! CSV出力モジュール - パネルデータの逐次ログ

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::parser::PanelRecord;

/// 結合CSVの列ヘッダー
const CSV_HEADERS: [&str; 14] = [
    "Source Image",
    "Panel Name",
    "Main Rating",
    "Voltage",
    "Phase",
    "Wire",
    "Poles",
    "KAIC",
    "Enclosure",
    "Circuit Number",
    "Load Description",
    "OCP Size",
    "Circuit Poles",
    "Feeder",
];

/// パネル1件ずつ追記する結合CSVログ
///
/// Excelは実行の最後にまとめて生成するため、処理済みパネルを
/// 即座にフラットな行として残しておく（途中終了時の保険）。
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// パネル1件分の回路行を追記する
    ///
    /// 新規ファイルの場合のみヘッダー行を書く。回路は出力順（左側→右側）。
    pub fn append_panel(&self, panel: &PanelRecord, source_image: &str) -> Result<()> {
        let is_new_file = !self.path.exists();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new_file {
            writer.write_record(CSV_HEADERS)?;
        }

        let panel_poles = if panel.poles > 0 {
            panel.poles.to_string()
        } else {
            String::new()
        };

        for circuit in panel.circuits() {
            let circuit_poles = circuit.poles.to_string();
            writer.write_record([
                source_image,
                panel.name.as_str(),
                panel.main_rating.as_str(),
                panel.voltage.as_str(),
                panel.phase.as_str(),
                panel.wire.as_str(),
                panel_poles.as_str(),
                panel.kaic.as_str(),
                panel.enclosure.as_str(),
                circuit.circuit_number.as_deref().unwrap_or(""),
                circuit.load_description.as_str(),
                circuit.protection_size.as_str(),
                circuit_poles.as_str(),
                circuit.feeder.as_deref().unwrap_or(""),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
