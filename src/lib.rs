// ==========================================
// 用户信息导入 - 核心库
// ==========================================
// 技术栈: Rust + calamine + SQLite
// 流程: Excel 工作表 → 表头校验 → 行映射 → 落库
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 工作表与用户信息
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - Excel 数据
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 应用层 - 共享状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{ImportOutcome, MergedRegion, Sheet, StoredUserInfo, UserInfo};

// 导入
pub use importer::{
    ImportError, ImportPipeline, ImportResult, MergeState, MergedRegionIndex, WorkbookFormat,
};

// 配置
pub use config::ImportSettings;

// 仓储
pub use repository::{UserInfoRepository, UserInfoRepositoryImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "用户信息导入";
