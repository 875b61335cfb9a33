// ==========================================
// 用户信息导入 - 配置层
// ==========================================
// 职责: 导入参数默认值 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use import_settings::{ColumnPlan, ImportSettings};
