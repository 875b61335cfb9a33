// ==========================================
// 用户信息导入 - 工作表领域模型
// ==========================================
// 职责: 内存中的工作表网格 + 合并单元格区域
// 说明: 工作簿解析后只保留目标 sheet，文件句柄随之释放
// ==========================================

use calamine::{Data, Dimensions, Range};
use serde::{Deserialize, Serialize};

// ==========================================
// MergedRegion - 合并单元格区域
// ==========================================
// 坐标均为 0 基；只有左上角单元格持有数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRegion {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl MergedRegion {
    /// 构造区域；首尾坐标颠倒时按 min/max 归一化，保证 first <= last
    pub fn new(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        Self {
            first_row: first_row.min(last_row),
            last_row: first_row.max(last_row),
            first_col: first_col.min(last_col),
            last_col: first_col.max(last_col),
        }
    }

    /// 单元格是否落在区域内（边界包含）
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// 合并行数
    pub fn row_span(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// 合并列数
    pub fn col_span(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    pub fn is_top_left(&self, row: u32, col: u32) -> bool {
        row == self.first_row && col == self.first_col
    }

    /// A1 表示法，如 "A1:B3"
    pub fn to_a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_letter(self.first_col),
            self.first_row + 1,
            column_letter(self.last_col),
            self.last_row + 1
        )
    }
}

impl From<&Dimensions> for MergedRegion {
    fn from(dims: &Dimensions) -> Self {
        // calamine: start/end = (row, col)，不保证 start <= end，由 new 归一化
        Self::new(dims.start.0, dims.end.0, dims.start.1, dims.end.1)
    }
}

// ==========================================
// Sheet - 工作表
// ==========================================
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: Range<Data>,
    merged_regions: Vec<MergedRegion>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, cells: Range<Data>) -> Self {
        Self {
            name: name.into(),
            cells,
            merged_regions: Vec::new(),
        }
    }

    /// 附加合并区域（保持工作表自身的顺序）
    pub fn with_merged_regions(mut self, regions: Vec<MergedRegion>) -> Self {
        self.merged_regions = regions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    /// 最后一个有数据的行号（0 基）；空表返回 None
    pub fn last_row(&self) -> Option<u32> {
        self.cells.end().map(|(row, _)| row)
    }

    /// 按绝对行号取行；超出已用区域返回 None（等同于"行不存在"）
    pub fn row(&self, index: u32) -> Option<Row<'_>> {
        let (start_row, start_col) = self.cells.start()?;
        let (end_row, _) = self.cells.end()?;
        if index < start_row || index > end_row {
            return None;
        }

        let cells = self.cells.rows().nth((index - start_row) as usize)?;
        Some(Row {
            index,
            first_col: start_col,
            cells,
        })
    }
}

// ==========================================
// Row - 行视图
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: u32,
    first_col: u32,
    cells: &'a [Data],
}

impl<'a> Row<'a> {
    /// 行号（0 基）
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Excel 显示行号（1 基），用于错误信息
    pub fn display_number(&self) -> u32 {
        self.index + 1
    }

    /// 取单元格；从未写入的单元格（Data::Empty）视为不存在
    pub fn cell(&self, col: u32) -> Option<&'a Data> {
        let offset = col.checked_sub(self.first_col)? as usize;
        self.cells
            .get(offset)
            .filter(|cell| !matches!(cell, Data::Empty))
    }
}

/// 0 基列号 → 列字母（0 → A, 26 → AA）
pub fn column_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// 解析 A1 引用为 (row, col)，均为 0 基
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.trim();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    Some((row - 1, col - 1))
}
