// ==========================================
// 用户信息导入 - 应用层
// ==========================================
// 职责: 装配数据库、配置与导入管道，供 CLI 使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
