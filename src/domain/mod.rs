// ==========================================
// 用户信息导入 - 领域模型层
// ==========================================
// 职责: 定义工作表模型、导入实体与结果
// 红线: 不含数据访问逻辑，不含导入流程逻辑
// ==========================================

pub mod sheet;
pub mod user_info;

// 重导出核心类型
pub use sheet::{column_letter, parse_cell_ref, MergedRegion, Row, Sheet};
pub use user_info::{ImportOutcome, StoredUserInfo, UserInfo};
