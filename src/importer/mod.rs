// ==========================================
// 用户信息导入 - 导入层
// ==========================================
// 职责: Excel 工作表 → UserInfo → 持久化
// 支持: .xlsx / .xls
// ==========================================

// 模块声明
pub mod cell_reader;
pub mod error;
pub mod header_validator;
pub mod import_pipeline;
pub mod import_trait;
pub mod merged_region_index;
pub mod row_mapper;
pub mod workbook_loader;
pub mod xls_merge_reader;

// 重导出核心类型
pub use cell_reader::CellReader;
pub use error::{HeaderMismatch, ImportError, ImportErrorKind, ImportResult};
pub use header_validator::HeaderValidator;
pub use import_pipeline::{ImportPipeline, ImportStage, StageTracker};
pub use merged_region_index::{MergeState, MergedRegionIndex};
pub use row_mapper::RowMapper;
pub use workbook_loader::{ExcelSheetLoader, WorkbookFormat};
pub use xls_merge_reader::{read_merged_regions, XlsMergeError};

// 重导出 Trait 接口
pub use import_trait::SheetLoader;
