// ==========================================
// 用户信息导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 全部 fail-fast，错误原样上抛给调用方
// ==========================================

use crate::domain::sheet::column_letter;
use crate::importer::xls_merge_reader::XlsMergeError;
use crate::repository::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// HeaderMismatch - 单列表头不匹配
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMismatch {
    pub column: u32,            // 0 基列号
    pub expected: String,       // 期望表头
    pub actual: Option<String>, // 实际表头（空白为 None）
}

impl fmt::Display for HeaderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "第{}列应该为{}",
            column_letter(self.column),
            self.expected
        )?;
        match &self.actual {
            Some(actual) => write!(f, "（实际为 {}）", actual),
            None => write!(f, "（实际为空）"),
        }
    }
}

fn describe_mismatches(mismatches: &[HeaderMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("；")
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("上传失败，文件无法打开 ({path}): {message}")]
    FileAccess { path: String, message: String },

    #[error("上传失败，文件类型错误: {0}（仅支持 .xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("上传失败，文件解析错误: {0}")]
    Parse(String),

    // ===== 结构错误 =====
    #[error("上传文件出错，sheet不存在: {0}")]
    MissingSheet(String),

    #[error("上传错误，第{row}行表头不能为空")]
    MissingHeader { row: u32 },

    #[error("表头错误，{}", describe_mismatches(.0))]
    HeaderMismatch(Vec<HeaderMismatch>),

    // ===== 数据行错误（row 为 Excel 显示行号）=====
    #[error("数据不能有空的 (第{row}行, 第{column}列)")]
    MissingValue { row: u32, column: String },

    #[error("数值格式错误 (第{row}行, 字段 {field}): {value}")]
    InvalidNumber {
        row: u32,
        field: String,
        value: String,
    },

    // ===== 持久化错误（原样透传）=====
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// 错误类别（用于 Failed 状态与结构化日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportErrorKind {
    FileAccess,
    UnsupportedFormat,
    Parse,
    MissingSheet,
    MissingHeader,
    HeaderMismatch,
    MissingValue,
    InvalidNumber,
    Persistence,
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::FileAccess { .. } => ImportErrorKind::FileAccess,
            ImportError::UnsupportedFormat(_) => ImportErrorKind::UnsupportedFormat,
            ImportError::Parse(_) => ImportErrorKind::Parse,
            ImportError::MissingSheet(_) => ImportErrorKind::MissingSheet,
            ImportError::MissingHeader { .. } => ImportErrorKind::MissingHeader,
            ImportError::HeaderMismatch(_) => ImportErrorKind::HeaderMismatch,
            ImportError::MissingValue { .. } => ImportErrorKind::MissingValue,
            ImportError::InvalidNumber { .. } => ImportErrorKind::InvalidNumber,
            ImportError::Persistence(_) => ImportErrorKind::Persistence,
        }
    }

    /// 构造缺值错误（row 为 0 基行号）
    pub fn missing_value(row: u32, column: u32) -> Self {
        ImportError::MissingValue {
            row: row + 1,
            column: column_letter(column),
        }
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<calamine::XlsError>
impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<XlsMergeError>
impl From<XlsMergeError> for ImportError {
    fn from(err: XlsMergeError) -> Self {
        ImportError::Parse(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
