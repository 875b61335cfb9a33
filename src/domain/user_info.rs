// ==========================================
// 用户信息导入 - 用户信息领域模型
// ==========================================
// 对齐: user_info 表
// 用途: 导入层写入，仓储层持久化
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// UserInfo - 用户信息（由一行数据映射而来）
// ==========================================
// 约束: 四个字段映射后均非空；age 非负；phone_number 不含小数尾巴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,         // 姓名
    pub age: u32,             // 年龄
    pub address: String,      // 地址
    pub phone_number: String, // 电话（文本存储）
}

impl UserInfo {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        address: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            address: address.into(),
            phone_number: phone_number.into(),
        }
    }
}

// ==========================================
// StoredUserInfo - 已落库的用户信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUserInfo {
    pub id: i64,
    pub batch_id: String,
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ImportOutcome - 单次导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub records: Vec<UserInfo>, // 按源行顺序
    pub inserted: usize,
    pub message: String,
    pub elapsed_ms: u64,
}
