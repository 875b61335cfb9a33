// ==========================================
// 用户信息导入 - 合并单元格索引
// ==========================================
// 职责: 回答"(row, col) 是否处于合并区域内，区域多大"
// 结构: 区域按 (first_row, first_col) 排序，二分定位后向前扫描
//       reach 前缀最大值保证扫描在不可能命中时立即停止
// 说明: 合并区域在同一 sheet 内互不重叠，每个单元格至多命中一个区域
// ==========================================

use crate::domain::sheet::{MergedRegion, Sheet};

/// 单元格合并状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    NotMerged,
    Merged {
        row_span: u32,
        col_span: u32,
        top_left: bool,
    },
}

impl MergeState {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeState::Merged { .. })
    }

    /// (row_span, col_span)；未合并为 (1, 1)
    pub fn spans(&self) -> (u32, u32) {
        match self {
            MergeState::NotMerged => (1, 1),
            MergeState::Merged {
                row_span, col_span, ..
            } => (*row_span, *col_span),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergedRegionIndex {
    regions: Vec<MergedRegion>,
    // 区域下标，按 (first_row, first_col) 升序
    order: Vec<usize>,
    // reach[i] = order[..=i] 中最大的 last_row
    reach: Vec<u32>,
}

impl MergedRegionIndex {
    /// 从工作表的合并区域建立索引
    pub fn build(sheet: &Sheet) -> Self {
        Self::from_regions(sheet.merged_regions().to_vec())
    }

    pub fn from_regions(regions: Vec<MergedRegion>) -> Self {
        let mut order: Vec<usize> = (0..regions.len()).collect();
        order.sort_by_key(|&idx| (regions[idx].first_row, regions[idx].first_col));

        let reach = order
            .iter()
            .scan(0u32, |max, &idx| {
                *max = (*max).max(regions[idx].last_row);
                Some(*max)
            })
            .collect();

        Self {
            regions,
            order,
            reach,
        }
    }

    /// 全部合并区域（保持工作表顺序）
    pub fn regions(&self) -> &[MergedRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// 查找包含 (row, col) 的合并区域
    pub fn find(&self, row: u32, col: u32) -> Option<&MergedRegion> {
        // 起始行不晚于 row 的区域都在 order[..end] 中
        let end = self
            .order
            .partition_point(|&idx| self.regions[idx].first_row <= row);

        for pos in (0..end).rev() {
            if self.reach[pos] < row {
                return None;
            }
            let region = &self.regions[self.order[pos]];
            if region.contains(row, col) {
                return Some(region);
            }
        }
        None
    }

    pub fn query(&self, row: u32, col: u32) -> MergeState {
        match self.find(row, col) {
            Some(region) => MergeState::Merged {
                row_span: region.row_span(),
                col_span: region.col_span(),
                top_left: region.is_top_left(row, col),
            },
            None => MergeState::NotMerged,
        }
    }
}
