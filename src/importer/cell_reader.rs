// ==========================================
// 用户信息导入 - 单元格读取器
// ==========================================
// 职责: 取单元格文本，值不能为空
// 说明: 数值单元格按显示文本读取（如 Float(34.0) → "34"，
//       源文件带出的 "34.0" 也原样保留，由 RowMapper 统一截断）
// ==========================================

use crate::domain::sheet::Row;
use crate::importer::error::{ImportError, ImportResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct CellReader;

impl CellReader {
    /// 读取必填单元格文本
    ///
    /// # 返回
    /// - Ok(String): 单元格文本（不做 trim）
    /// - Err(MissingValue): 单元格不存在或为空白
    pub fn read_required_text(&self, row: &Row<'_>, column: u32) -> ImportResult<String> {
        match row.cell(column).map(|cell| cell.to_string()) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ImportError::missing_value(row.index(), column)),
        }
    }
}
