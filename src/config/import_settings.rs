// ==========================================
// 用户信息导入 - 导入参数
// ==========================================
// 职责: sheet 名、表头行、数据起始行、列计划、期望表头
// 默认: "Sheet1" / 第 0 行表头 / 第 1 行起为数据 / A-D 四列
// ==========================================

use crate::i18n;
use serde::{Deserialize, Serialize};

/// 默认 sheet 名
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// 默认语言
pub const DEFAULT_LOCALE: &str = "en";

/// 默认表头（按列 A-D）
pub const DEFAULT_HEADER_LABELS: [&str; 4] = ["Name", "Age", "Address", "Phone"];

// ==========================================
// ColumnPlan - 字段到列的映射（0 基列号）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPlan {
    pub name: u32,
    pub age: u32,
    pub address: u32,
    pub phone_number: u32,
}

impl ColumnPlan {
    /// 覆盖到的列数（最大列号 + 1），表头标签至少需要这么多项
    pub fn width(&self) -> usize {
        [self.name, self.age, self.address, self.phone_number]
            .into_iter()
            .max()
            .map_or(0, |col| col as usize + 1)
    }
}

impl Default for ColumnPlan {
    fn default() -> Self {
        Self {
            name: 0,
            age: 1,
            address: 2,
            phone_number: 3,
        }
    }
}

// ==========================================
// ImportSettings - 单次导入参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub sheet_name: String,
    pub header_row: u32,
    pub first_data_row: u32,
    pub columns: ColumnPlan,
    /// 期望表头，按位置比对：第 i 个标签对应第 i 列
    pub header_labels: Vec<String>,
    pub locale: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_row: 0,
            first_data_row: 1,
            columns: ColumnPlan::default(),
            header_labels: DEFAULT_HEADER_LABELS.iter().map(|s| s.to_string()).collect(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ImportSettings {
    /// 按语言生成本地化表头（如 zh-CN: 姓名/年龄/地址/电话）
    pub fn for_locale(locale: &str) -> Self {
        let header_labels = ["header.name", "header.age", "header.address", "header.phone"]
            .iter()
            .map(|key| i18n::t(locale, key))
            .collect();

        Self {
            header_labels,
            locale: locale.to_string(),
            ..Self::default()
        }
    }
}
