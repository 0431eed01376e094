//! Excel出力モジュール - パネルスケジュールのワークブック生成

use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tempfile::NamedTempFile;

use crate::error::{PanelError, Result};
use crate::parser::PanelRecord;

const SHEET_NAME: &str = "Panel Schedules";

/// 回路表の固定列ヘッダー
pub const COLUMN_HEADERS: [&str; 5] = [
    "Load Description",
    "Overcurrent Protection Size (Fuse or CB Trip Size)",
    "Poles",
    "Feeder",
    "Circuit #",
];

/// パネルブロック間の空行数
pub const PANEL_SPACING: u32 = 4;

/// 列幅 (Load Description / OCP / Poles / Feeder / Circuit #)
const COLUMN_WIDTHS: [f64; 5] = [40.0, 30.0, 10.0, 30.0, 12.0];

/// パネルレコード群を1つのワークブックに書き出す
///
/// ブロック構成はパネルごとに「説明行 / 列ヘッダー行 / 回路行(左側→右側)」。
/// 書き込みは全件成功か失敗かのどちらかで、途中まで書けた
/// ファイルを出力先に残さない（一時ファイル経由のアトミック書き込み）。
pub fn write_panels(panels: &[PanelRecord], destination: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let title_format = Format::new().set_bold().set_font_size(12);
    let header_format = Format::new().set_bold().set_text_wrap();

    let mut row = 0u32;
    for (idx, panel) in panels.iter().enumerate() {
        if idx > 0 {
            row += PANEL_SPACING;
        }
        row = write_panel(sheet, panel, row, &title_format, &header_format)?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    let buffer = workbook.save_to_buffer()?;
    write_atomically(&buffer, destination)
}

/// 1パネル分のブロックを書き、次の空き行番号を返す
fn write_panel(
    sheet: &mut Worksheet,
    panel: &PanelRecord,
    start_row: u32,
    title_format: &Format,
    header_format: &Format,
) -> Result<u32> {
    let mut row = start_row;

    sheet.write_string_with_format(row, 0, panel.description(), title_format)?;
    row += 1;

    for (col, header) in COLUMN_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *header, header_format)?;
    }
    row += 1;

    for circuit in panel.circuits() {
        sheet.write_string(row, 0, circuit.load_description.as_str())?;
        sheet.write_string(row, 1, circuit.protection_size.as_str())?;
        sheet.write_number(row, 2, circuit.poles as f64)?;
        sheet.write_string(row, 3, circuit.feeder.as_deref().unwrap_or(""))?;
        // 回路番号("1-3"など)は日付や数式に化けないよう必ず文字列で書く
        sheet.write_string(row, 4, circuit.circuit_number.as_deref().unwrap_or(""))?;
        row += 1;
    }

    Ok(row)
}

/// 一時ファイルに書いてから出力先にリネームする
fn write_atomically(buffer: &[u8], destination: &Path) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut temp_file = NamedTempFile::new_in(&dir)?;
    temp_file.write_all(buffer)?;
    temp_file
        .persist(destination)
        .map_err(|e| PanelError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CircuitRow, PanelRecord};
    use calamine::{DataType, Range, Reader, Xlsx, open_workbook};

    fn circuit(number: &str, load: &str) -> CircuitRow {
        CircuitRow {
            circuit_number: (!number.is_empty()).then(|| number.to_string()),
            load_description: load.to_string(),
            protection_size: "20A".to_string(),
            poles: 1,
            feeder: None,
        }
    }

    fn panel(name: &str, left: usize, right: usize) -> PanelRecord {
        PanelRecord {
            name: name.to_string(),
            main_rating: "100A MLO".to_string(),
            voltage: "208Y/120".to_string(),
            phase: "3".to_string(),
            wire: "4".to_string(),
            poles: 42,
            kaic: "22KAIC".to_string(),
            enclosure: "NEMA1".to_string(),
            left_circuits: (0..left).map(|i| circuit(&format!("L{}", i), "Lighting")).collect(),
            right_circuits: (0..right).map(|i| circuit(&format!("R{}", i), "Receptacles")).collect(),
        }
    }

    fn read_sheet(path: &Path) -> Range<DataType> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap().unwrap()
    }

    fn cell_string(range: &Range<DataType>, row: u32, col: u32) -> String {
        match range.get_value((row, col)) {
            Some(DataType::String(s)) => s.clone(),
            Some(DataType::Float(f)) => f.to_string(),
            Some(DataType::Int(i)) => i.to_string(),
            _ => String::new(),
        }
    }

    fn is_blank_row(range: &Range<DataType>, row: u32) -> bool {
        (0..5).all(|col| cell_string(range, row, col).is_empty())
    }

    #[test]
    fn single_panel_block_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let p = panel("LP-1", 2, 3);
        write_panels(&[p.clone()], &path).unwrap();

        let range = read_sheet(&path);
        assert_eq!(cell_string(&range, 0, 0), p.description());
        for (col, header) in COLUMN_HEADERS.iter().enumerate() {
            assert_eq!(cell_string(&range, 1, col as u32), *header);
        }
        // 回路行は左側→右側の順で左右合計ぶん
        assert_eq!(cell_string(&range, 2, 4), "L0");
        assert_eq!(cell_string(&range, 3, 4), "L1");
        assert_eq!(cell_string(&range, 4, 4), "R0");
        assert_eq!(cell_string(&range, 6, 4), "R2");
        assert_eq!(range.get_size().0, 7);
    }

    #[test]
    fn four_blank_rows_between_blocks_none_before_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let first = panel("LP-1", 1, 1);
        let second = panel("LP-2", 1, 0);
        write_panels(&[first.clone(), second.clone()], &path).unwrap();

        let range = read_sheet(&path);
        // 1ブロック目: 行0-3 (説明+ヘッダー+回路2行)、その後4行空き
        assert_eq!(cell_string(&range, 0, 0), first.description());
        for row in 4..8 {
            assert!(is_blank_row(&range, row), "row {} should be blank", row);
        }
        assert_eq!(cell_string(&range, 8, 0), second.description());
        assert_eq!(cell_string(&range, 9, 0), COLUMN_HEADERS[0]);
    }

    #[test]
    fn circuit_number_range_survives_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut p = panel("LP-1", 0, 0);
        p.left_circuits = vec![circuit("1-3", "RTU-1")];
        write_panels(&[p], &path).unwrap();

        let range = read_sheet(&path);
        assert!(matches!(
            range.get_value((2, 4)),
            Some(DataType::String(s)) if s == "1-3"
        ));
    }

    #[test]
    fn poles_written_as_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut p = panel("LP-1", 0, 0);
        let mut c = circuit("1", "AHU-1");
        c.poles = 3;
        p.left_circuits = vec![c];
        write_panels(&[p], &path).unwrap();

        let range = read_sheet(&path);
        assert!(matches!(
            range.get_value((2, 2)),
            Some(DataType::Float(f)) if (*f - 3.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn zero_panels_still_writes_valid_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_panels(&[], &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert!(workbook.sheet_names().contains(&SHEET_NAME.to_string()));
    }

    #[test]
    fn overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_panels(&[panel("OLD", 1, 0)], &path).unwrap();
        write_panels(&[panel("NEW", 1, 0)], &path).unwrap();

        let range = read_sheet(&path);
        assert!(cell_string(&range, 0, 0).starts_with("Panel NEW"));
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.xlsx");
        write_panels(&[panel("LP-1", 1, 0)], &path).unwrap();
        assert!(path.exists());
    }
}
