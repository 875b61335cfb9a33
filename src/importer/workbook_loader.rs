// ==========================================
// 用户信息导入 - 工作簿加载器
// ==========================================
// 支持: Excel (.xlsx / .xls)，按扩展名识别（不区分大小写）
// 说明: 打开 → 读取目标 sheet → 关闭，只把 Sheet 交给后续阶段
// ==========================================

use crate::domain::sheet::{MergedRegion, Sheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::SheetLoader;
use crate::importer::xls_merge_reader::read_merged_regions;
use calamine::{Reader, Xls, Xlsx};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::Path;
use tracing::debug;

/// 工作簿格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkbookFormat {
    Xlsx, // OOXML
    Xls,  // BIFF
}

impl WorkbookFormat {
    /// 根据文件名扩展名识别格式
    ///
    /// # 返回
    /// - Err(UnsupportedFormat): 扩展名缺失或不是 xlsx/xls
    pub fn detect(file_name: &str) -> ImportResult<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => Ok(WorkbookFormat::Xlsx),
            "xls" => Ok(WorkbookFormat::Xls),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "xlsx",
            WorkbookFormat::Xls => "xls",
        }
    }
}

impl fmt::Display for WorkbookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ==========================================
// ExcelSheetLoader - 基于 calamine 的实现
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelSheetLoader;

impl ExcelSheetLoader {
    fn open(path: &Path) -> ImportResult<BufReader<File>> {
        let file = File::open(path).map_err(|e| file_access_error(path, e))?;
        Ok(BufReader::new(file))
    }

    fn load_xlsx(path: &Path, sheet_name: &str) -> ImportResult<Sheet> {
        let mut workbook = Xlsx::new(Self::open(path)?)?;
        ensure_sheet_exists(&workbook.sheet_names(), sheet_name)?;

        let cells = workbook.worksheet_range(sheet_name)?;

        workbook.load_merged_regions()?;
        let merged_regions: Vec<MergedRegion> = workbook
            .merged_regions_by_sheet(sheet_name)
            .into_iter()
            .map(|(_, _, dims)| MergedRegion::from(dims))
            .collect();

        Ok(Sheet::new(sheet_name, cells).with_merged_regions(merged_regions))
    }

    fn load_xls(path: &Path, sheet_name: &str) -> ImportResult<Sheet> {
        // 整个文件读入内存一次: calamine 解析单元格，合并区域单独扫描 BIFF 记录
        let bytes = fs::read(path).map_err(|e| file_access_error(path, e))?;

        let mut workbook = Xls::new(Cursor::new(bytes.as_slice()))?;
        ensure_sheet_exists(&workbook.sheet_names(), sheet_name)?;

        let cells = workbook.worksheet_range(sheet_name)?;
        let merged_regions = read_merged_regions(&bytes, sheet_name)?;

        Ok(Sheet::new(sheet_name, cells).with_merged_regions(merged_regions))
    }
}

impl SheetLoader for ExcelSheetLoader {
    fn load_sheet(
        &self,
        path: &Path,
        format: WorkbookFormat,
        sheet_name: &str,
    ) -> ImportResult<Sheet> {
        let sheet = match format {
            WorkbookFormat::Xlsx => Self::load_xlsx(path, sheet_name)?,
            WorkbookFormat::Xls => Self::load_xls(path, sheet_name)?,
        };

        debug!(
            sheet = sheet_name,
            %format,
            last_row = ?sheet.last_row(),
            merged = sheet.merged_regions().len(),
            "工作表读取完成"
        );
        Ok(sheet)
    }
}

fn file_access_error(path: &Path, err: std::io::Error) -> ImportError {
    ImportError::FileAccess {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn ensure_sheet_exists(sheet_names: &[String], sheet_name: &str) -> ImportResult<()> {
    if sheet_names.iter().any(|name| name == sheet_name) {
        Ok(())
    } else {
        Err(ImportError::MissingSheet(sheet_name.to_string()))
    }
}
