// ==========================================
// 用户信息导入 - 表头校验器
// ==========================================
// 规则: 第 i 个期望标签与第 i 列比对（逐列独立判断）
// 策略: 先收集全部不匹配项，再合并为一个 HeaderMismatch 错误
// ==========================================

use crate::domain::sheet::Sheet;
use crate::importer::error::{HeaderMismatch, ImportError, ImportResult};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderValidator;

impl HeaderValidator {
    /// 校验表头行
    ///
    /// # 参数
    /// - sheet: 工作表
    /// - header_row: 表头行号（0 基）
    /// - expected_labels: 期望表头，按列顺序
    ///
    /// # 返回
    /// - Err(MissingHeader): 表头行不存在
    /// - Err(HeaderMismatch): 至少一列不匹配，包含所有不匹配列
    pub fn validate_header(
        &self,
        sheet: &Sheet,
        header_row: u32,
        expected_labels: &[String],
    ) -> ImportResult<()> {
        let row = sheet
            .row(header_row)
            .ok_or(ImportError::MissingHeader {
                row: header_row + 1,
            })?;

        let mismatches: Vec<HeaderMismatch> = expected_labels
            .iter()
            .zip(0u32..)
            .filter_map(|(expected, column)| {
                let actual = row
                    .cell(column)
                    .map(|cell| cell.to_string().trim().to_string())
                    .filter(|text| !text.is_empty());

                match actual {
                    Some(ref text) if text == expected.trim() => None,
                    _ => Some(HeaderMismatch {
                        column,
                        expected: expected.clone(),
                        actual,
                    }),
                }
            })
            .collect();

        if mismatches.is_empty() {
            debug!(columns = expected_labels.len(), "表头校验通过");
            Ok(())
        } else {
            warn!(mismatched = mismatches.len(), "表头校验失败");
            Err(ImportError::HeaderMismatch(mismatches))
        }
    }
}
