// ==========================================
// 用户信息导入 - 工作表加载 Trait
// ==========================================
// 职责: 定义工作簿读取接口（不包含实现）
// 实现者: ExcelSheetLoader
// ==========================================

use crate::domain::sheet::Sheet;
use crate::importer::error::ImportResult;
use crate::importer::workbook_loader::WorkbookFormat;
use std::path::Path;

pub trait SheetLoader: Send + Sync {
    /// 读取指定工作表到内存
    ///
    /// # 参数
    /// - path: 文件路径
    /// - format: 已识别的工作簿格式
    /// - sheet_name: 目标工作表名称（精确匹配）
    ///
    /// # 返回
    /// - Ok(Sheet): 单元格网格 + 合并区域，文件句柄在返回前关闭
    /// - Err(FileAccess / Parse / MissingSheet)
    fn load_sheet(&self, path: &Path, format: WorkbookFormat, sheet_name: &str)
        -> ImportResult<Sheet>;
}
