// ==========================================
// 用户信息导入 - 行映射器
// ==========================================
// 职责: 数据行 → UserInfo + 类型转换
// 规则:
// - name / address: 原样文本
// - age: 取第一个 '.' 之前的部分，解析为非负整数
// - phone_number: 取第一个 '.' 之前的部分，保留为文本
// 策略: 任一行失败即中止整个导入（fail-fast，不跳行）
// ==========================================

use crate::config::import_settings::ColumnPlan;
use crate::domain::sheet::{Row, Sheet};
use crate::domain::user_info::UserInfo;
use crate::importer::cell_reader::CellReader;
use crate::importer::error::{ImportError, ImportResult};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct RowMapper {
    cell_reader: CellReader,
}

impl RowMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 映射 start_row 到最后一个有数据行（含）之间的所有行
    ///
    /// # 返回
    /// - Ok(Vec<UserInfo>): 按源行顺序
    /// - Err: 第一个失败的行/字段
    pub fn map_rows(
        &self,
        sheet: &Sheet,
        start_row: u32,
        plan: &ColumnPlan,
    ) -> ImportResult<Vec<UserInfo>> {
        let Some(last_row) = sheet.last_row() else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for index in start_row..=last_row {
            // 已用区域之前的行视为整行缺失
            let row = sheet
                .row(index)
                .ok_or_else(|| ImportError::missing_value(index, plan.name))?;

            let record = self.map_row(&row, plan).inspect_err(|e| {
                warn!(row = index + 1, error = %e, "数据行映射失败");
            })?;
            records.push(record);
        }

        debug!(count = records.len(), "数据行映射完成");
        Ok(records)
    }

    /// 映射单行
    pub fn map_row(&self, row: &Row<'_>, plan: &ColumnPlan) -> ImportResult<UserInfo> {
        let name = self.cell_reader.read_required_text(row, plan.name)?;

        let age_text = self.cell_reader.read_required_text(row, plan.age)?;
        let age = parse_age(&age_text, row.display_number())?;

        let address = self.cell_reader.read_required_text(row, plan.address)?;

        let phone_text = self.cell_reader.read_required_text(row, plan.phone_number)?;
        let phone_number = strip_fraction(&phone_text).trim().to_string();
        if phone_number.is_empty() {
            return Err(ImportError::missing_value(row.index(), plan.phone_number));
        }

        Ok(UserInfo {
            name,
            age,
            address,
            phone_number,
        })
    }
}

/// 截断第一个 '.' 及其之后的部分（"34.0" → "34"）
pub fn strip_fraction(text: &str) -> &str {
    text.split('.').next().unwrap_or(text)
}

/// 解析年龄（row 为 Excel 显示行号）
fn parse_age(text: &str, row: u32) -> ImportResult<u32> {
    strip_fraction(text)
        .trim()
        .parse::<u32>()
        .map_err(|_| ImportError::InvalidNumber {
            row,
            field: "age".to_string(),
            value: text.to_string(),
        })
}
