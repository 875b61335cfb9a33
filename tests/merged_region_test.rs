// ==========================================
// 合并单元格索引集成测试
// ==========================================
// 测试目标: 从真实 xlsx / xls 读取合并区域并查询
// ==========================================

mod test_helpers;

use calamine::Data;
use tempfile::TempDir;
use test_helpers::{header_row, sheet_from_rows, write_xls, write_xlsx, Cell};
use user_info_import::domain::MergedRegion;
use user_info_import::importer::{
    ExcelSheetLoader, ImportError, MergeState, MergedRegionIndex, SheetLoader, WorkbookFormat,
};

#[test]
fn test_merged_regions_loaded_from_xlsx() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("merged.xlsx");
    let rows = vec![
        header_row(),
        vec![Cell::Blank, Cell::Number(30.0), Cell::Text("X St"), Cell::Text("1")],
    ];
    // B4:C5 与 A2:A3
    write_xlsx(&path, "Sheet1", &rows, &[(3, 1, 4, 2, "note"), (1, 0, 2, 0, "Ann")]).unwrap();

    let sheet = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xlsx, "Sheet1")
        .unwrap();
    let index = MergedRegionIndex::build(&sheet);

    assert_eq!(index.len(), 2);
    assert!(index.regions().contains(&MergedRegion::new(3, 4, 1, 2)));
    assert!(index.regions().contains(&MergedRegion::new(1, 2, 0, 0)));

    assert_eq!(
        index.query(4, 2),
        MergeState::Merged {
            row_span: 2,
            col_span: 2,
            top_left: false,
        }
    );
    assert_eq!(
        index.query(1, 0),
        MergeState::Merged {
            row_span: 2,
            col_span: 1,
            top_left: true,
        }
    );
    assert_eq!(index.query(0, 0), MergeState::NotMerged);
    assert_eq!(index.query(3, 3), MergeState::NotMerged);
}

#[test]
fn test_cells_and_merges_loaded_from_xls() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("merged.xls");
    let rows = vec![
        header_row(),
        vec![Cell::Blank, Cell::Number(30.0), Cell::Text("X St"), Cell::Text("1234567")],
        vec![Cell::Blank, Cell::Number(41.0), Cell::Text("北京"), Cell::Number(7654321.0)],
    ];
    // A2:A3 与 B5:C6
    write_xls(&path, "用户", &rows, &[(1, 0, 2, 0, "Ann"), (4, 1, 5, 2, "note")]).unwrap();

    let sheet = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xls, "用户")
        .unwrap();

    // 单元格
    assert_eq!(sheet.name(), "用户");
    assert_eq!(sheet.last_row(), Some(4));
    let header = sheet.row(0).unwrap();
    assert_eq!(header.cell(0), Some(&Data::String("Name".to_string())));
    assert_eq!(header.cell(3), Some(&Data::String("Phone".to_string())));
    let first = sheet.row(1).unwrap();
    assert_eq!(first.cell(0), Some(&Data::String("Ann".to_string())));
    assert_eq!(first.cell(1), Some(&Data::Float(30.0)));
    let second = sheet.row(2).unwrap();
    assert!(second.cell(0).is_none());
    assert_eq!(second.cell(2), Some(&Data::String("北京".to_string())));
    assert_eq!(second.cell(3), Some(&Data::Float(7654321.0)));

    // 合并区域保持记录顺序
    assert_eq!(
        sheet.merged_regions(),
        &[MergedRegion::new(1, 2, 0, 0), MergedRegion::new(4, 5, 1, 2)]
    );
    let index = MergedRegionIndex::build(&sheet);
    assert_eq!(
        index.query(2, 0),
        MergeState::Merged {
            row_span: 2,
            col_span: 1,
            top_left: false,
        }
    );
    assert_eq!(index.query(5, 2).spans(), (2, 2));
    assert_eq!(index.query(3, 0), MergeState::NotMerged);
}

#[test]
fn test_xls_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.xls");
    write_xls(&path, "Data", &[header_row()], &[]).unwrap();

    let err = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xls, "Sheet1")
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingSheet(ref name) if name == "Sheet1"));

    let sheet = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xls, "Data")
        .unwrap();
    assert!(sheet.merged_regions().is_empty());
}

#[test]
fn test_full_column_merges_from_xls() {
    // BIFF8 整列合并: 每个区域覆盖 65_536 行
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("columns.xls");
    let merges: Vec<_> = (0..16u16)
        .map(|col| (0u32, col, 65_535u32, col, "x"))
        .collect();
    write_xls(&path, "Sheet1", &[], &merges).unwrap();

    let sheet = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xls, "Sheet1")
        .unwrap();
    let index = MergedRegionIndex::build(&sheet);

    assert_eq!(index.len(), 16);
    assert_eq!(index.query(65_535, 15).spans(), (65_536, 1));
    assert_eq!(
        index.query(0, 3),
        MergeState::Merged {
            row_span: 65_536,
            col_span: 1,
            top_left: true,
        }
    );
    assert!(index.query(30_000, 7).is_merged());
    assert!(!index.query(30_000, 16).is_merged());
}

#[test]
fn test_workbook_without_merges() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.xlsx");
    write_xlsx(&path, "Sheet1", &[header_row()], &[]).unwrap();

    let sheet = ExcelSheetLoader
        .load_sheet(&path, WorkbookFormat::Xlsx, "Sheet1")
        .unwrap();
    let index = MergedRegionIndex::build(&sheet);

    assert!(index.is_empty());
    for row in 0..5 {
        for col in 0..5 {
            assert!(!index.query(row, col).is_merged());
        }
    }
}

#[test]
fn test_in_memory_sheet_has_no_merges() {
    let sheet = sheet_from_rows("Sheet1", &[&["Name", "Age"], &["Ann", "30"]]);
    let index = MergedRegionIndex::build(&sheet);
    assert_eq!(index.query(1, 1).spans(), (1, 1));
}
