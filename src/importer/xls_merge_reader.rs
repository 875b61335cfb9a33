// ==========================================
// 用户信息导入 - xls 合并区域读取
// ==========================================
// 格式: OLE 复合文档 (CFB) → Workbook 流 → BIFF8 记录
// 说明: calamine 0.25 的 Xls 不暴露合并区域，这里只扫描
//       BOUNDSHEET 与目标 sheet 子流中的 MERGECELLS，单元格仍由 calamine 解析
// ==========================================

use crate::domain::sheet::MergedRegion;
use thiserror::Error;

const SIGNATURE: u64 = 0xE11A_B1A1_E011_CFD0;
const HEADER_LEN: usize = 512;
const DIR_ENTRY_LEN: usize = 128;
const MINI_SECTOR_SIZE: usize = 64;
const MINI_STREAM_CUTOFF: usize = 4096;
// 大于等于该值的扇区号均为保留值（ENDOFCHAIN / FREESECT 等）
const MAX_REG_SECT: u32 = 0xFFFF_FFFA;

// BIFF 记录类型
const RT_EOF: u16 = 0x000A;
const RT_BOUNDSHEET: u16 = 0x0085;
const RT_MERGECELLS: u16 = 0x00E5;
const RT_BOF: u16 = 0x0809;
const BIFF8_VERSION: u16 = 0x0600;

/// xls 合并区域读取错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XlsMergeError {
    #[error("文件不是 OLE 复合文档")]
    Signature,

    #[error("不支持的扇区大小 2^{0}")]
    SectorShift(u16),

    #[error("扇区 {0} 越界")]
    SectorOutOfRange(u32),

    #[error("扇区链存在环")]
    ChainLoop,

    #[error("找不到 Workbook 流")]
    MissingWorkbookStream,

    #[error("BIFF 记录在偏移 {0} 处截断")]
    Truncated(usize),

    #[error("sheet 子流偏移 {0} 越界")]
    SheetOffset(usize),
}

pub type XlsMergeResult<T> = Result<T, XlsMergeError>;

/// 读取 xls 工作簿中指定 sheet 的合并区域（保持记录中的顺序）
///
/// BIFF8 之前的格式没有 MERGECELLS 记录，返回空列表；
/// 找不到 sheet 同样返回空列表（sheet 是否存在由调用方校验）
pub fn read_merged_regions(bytes: &[u8], sheet_name: &str) -> XlsMergeResult<Vec<MergedRegion>> {
    let compound = CompoundFile::parse(bytes)?;
    let stream = compound
        .stream("Workbook")
        .or_else(|| compound.stream("Book"))
        .ok_or(XlsMergeError::MissingWorkbookStream)??;

    let Some(offset) = find_sheet_offset(&stream, sheet_name)? else {
        return Ok(Vec::new());
    };
    collect_merge_cells(&stream, offset)
}

// ==========================================
// 复合文档 (CFB)
// ==========================================

#[derive(Debug)]
struct DirEntry {
    name: String,
    start: u32,
    size: usize,
}

struct CompoundFile<'a> {
    data: &'a [u8],
    sector_size: usize,
    fat: Vec<u32>,
    entries: Vec<DirEntry>,
    mini_fat: Vec<u32>,
    mini_stream: Vec<u8>,
}

impl<'a> CompoundFile<'a> {
    fn parse(data: &'a [u8]) -> XlsMergeResult<Self> {
        if data.len() < HEADER_LEN || read_u64(data, 0) != SIGNATURE {
            return Err(XlsMergeError::Signature);
        }

        let sector_size = match read_u16(data, 30) {
            0x0009 => 512,
            0x000C => 4096,
            shift => return Err(XlsMergeError::SectorShift(shift)),
        };

        let mut compound = CompoundFile {
            data,
            sector_size,
            fat: Vec::new(),
            entries: Vec::new(),
            mini_fat: Vec::new(),
            mini_stream: Vec::new(),
        };

        // DIFAT: 头部 109 项 + 后续 DIFAT 扇区（每扇区最后一项指向下一扇区）
        let mut difat: Vec<u32> = to_u32s(&data[76..HEADER_LEN]).collect();
        let mut next = read_u32(data, 68);
        let mut visited = 0usize;
        while next < MAX_REG_SECT {
            visited += 1;
            if visited > compound.sector_count() {
                return Err(XlsMergeError::ChainLoop);
            }
            let mut ids: Vec<u32> = to_u32s(compound.sector(next)?).collect();
            next = ids.pop().unwrap_or(u32::MAX);
            difat.extend(ids);
        }

        let mut fat = Vec::new();
        for id in difat.into_iter().filter(|id| *id < MAX_REG_SECT) {
            fat.extend(to_u32s(compound.sector(id)?));
        }
        compound.fat = fat;

        let directory = compound.read_chain(read_u32(data, 48), None)?;
        compound.entries = directory
            .chunks_exact(DIR_ENTRY_LEN)
            .map(DirEntry::from_bytes)
            .collect();

        if read_u32(data, 64) > 0 {
            let mini_fat = compound.read_chain(read_u32(data, 60), None)?;
            compound.mini_fat = to_u32s(&mini_fat).collect();
        }

        // 根目录项的数据即 mini stream
        if let Some((start, size)) = compound.entries.first().map(|root| (root.start, root.size)) {
            compound.mini_stream = compound.read_chain(start, Some(size))?;
        }

        Ok(compound)
    }

    fn sector_count(&self) -> usize {
        (self.data.len() - HEADER_LEN).div_ceil(self.sector_size)
    }

    fn sector(&self, id: u32) -> XlsMergeResult<&'a [u8]> {
        // 扇区 0 紧跟在 512 字节头部之后（4096 扇区时头部占满首个扇区）
        let start = (id as usize + 1) * self.sector_size;
        if start >= self.data.len() {
            return Err(XlsMergeError::SectorOutOfRange(id));
        }
        let data = self.data;
        let end = data.len().min(start + self.sector_size);
        Ok(&data[start..end])
    }

    fn read_chain(&self, start: u32, size: Option<usize>) -> XlsMergeResult<Vec<u8>> {
        let mut bytes = Vec::new();
        for id in follow_chain(start, &self.fat)? {
            bytes.extend_from_slice(self.sector(id)?);
        }
        if let Some(size) = size {
            bytes.truncate(size);
        }
        Ok(bytes)
    }

    fn read_mini_chain(&self, start: u32, size: usize) -> XlsMergeResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(size);
        for id in follow_chain(start, &self.mini_fat)? {
            let begin = id as usize * MINI_SECTOR_SIZE;
            let end = self.mini_stream.len().min(begin + MINI_SECTOR_SIZE);
            if begin >= end {
                return Err(XlsMergeError::SectorOutOfRange(id));
            }
            bytes.extend_from_slice(&self.mini_stream[begin..end]);
        }
        bytes.truncate(size);
        Ok(bytes)
    }

    /// 按名称取流；找不到返回 None
    fn stream(&self, name: &str) -> Option<XlsMergeResult<Vec<u8>>> {
        // 根目录项本身不是流
        let entry = self.entries.iter().skip(1).find(|e| e.name == name)?;
        Some(if entry.size < MINI_STREAM_CUTOFF {
            self.read_mini_chain(entry.start, entry.size)
        } else {
            self.read_chain(entry.start, Some(entry.size))
        })
    }
}

impl DirEntry {
    fn from_bytes(raw: &[u8]) -> Self {
        // 名称长度含结尾 NUL，单位为字节
        let name_len = (read_u16(raw, 64) as usize).min(64);
        let units: Vec<u16> = raw[..name_len]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|unit| *unit != 0)
            .collect();

        DirEntry {
            name: String::from_utf16_lossy(&units),
            start: read_u32(raw, 116),
            // v3 文件只使用低 32 位
            size: read_u32(raw, 120) as usize,
        }
    }
}

fn follow_chain(start: u32, table: &[u32]) -> XlsMergeResult<Vec<u32>> {
    let mut ids = Vec::new();
    let mut id = start;
    while id < MAX_REG_SECT {
        if ids.len() > table.len() {
            return Err(XlsMergeError::ChainLoop);
        }
        ids.push(id);
        id = *table
            .get(id as usize)
            .ok_or(XlsMergeError::SectorOutOfRange(id))?;
    }
    Ok(ids)
}

// ==========================================
// BIFF 记录
// ==========================================

struct Record<'a> {
    typ: u16,
    data: &'a [u8],
}

struct RecordIter<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> RecordIter<'a> {
    fn new(stream: &'a [u8], pos: usize) -> Self {
        Self { stream, pos }
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = XlsMergeResult<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.stream.len().saturating_sub(self.pos);
        if remaining == 0 {
            return None;
        }
        if remaining < 4 {
            return Some(Err(XlsMergeError::Truncated(self.pos)));
        }

        let typ = read_u16(self.stream, self.pos);
        let len = read_u16(self.stream, self.pos + 2) as usize;
        let start = self.pos + 4;
        if start + len > self.stream.len() {
            return Some(Err(XlsMergeError::Truncated(self.pos)));
        }

        self.pos = start + len;
        Some(Ok(Record {
            typ,
            data: &self.stream[start..start + len],
        }))
    }
}

/// 扫描全局子流，返回目标 sheet 子流的起始偏移
fn find_sheet_offset(stream: &[u8], sheet_name: &str) -> XlsMergeResult<Option<usize>> {
    for record in RecordIter::new(stream, 0) {
        let record = record?;
        match record.typ {
            RT_BOF => {
                if record.data.len() < 2 || read_u16(record.data, 0) != BIFF8_VERSION {
                    return Ok(None);
                }
            }
            RT_BOUNDSHEET => {
                if let Some((offset, name)) = parse_bound_sheet(record.data) {
                    if name == sheet_name {
                        return Ok(Some(offset));
                    }
                }
            }
            RT_EOF => break,
            _ => {}
        }
    }
    Ok(None)
}

/// BOUNDSHEET: lbPlyPos(4) + hsState(1) + dt(1) + ShortXLUnicodeString
fn parse_bound_sheet(data: &[u8]) -> Option<(usize, String)> {
    if data.len() < 8 {
        return None;
    }
    let offset = read_u32(data, 0) as usize;
    let cch = data[6] as usize;
    let chars = &data[8..];

    let name = if data[7] & 0x01 != 0 {
        let units: Vec<u16> = chars
            .chunks_exact(2)
            .take(cch)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        // 压缩字符串: 每个字符只存低字节
        chars.iter().take(cch).map(|b| char::from(*b)).collect()
    };
    Some((offset, name))
}

/// 收集 sheet 子流中的 MERGECELLS，嵌入图表等子流内的记录不计入
fn collect_merge_cells(stream: &[u8], offset: usize) -> XlsMergeResult<Vec<MergedRegion>> {
    if offset >= stream.len() {
        return Err(XlsMergeError::SheetOffset(offset));
    }

    let mut regions = Vec::new();
    let mut depth = 0usize;
    for record in RecordIter::new(stream, offset) {
        let record = record?;
        match record.typ {
            RT_BOF => depth += 1,
            RT_EOF => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            RT_MERGECELLS if depth == 1 => parse_merge_cells(record.data, &mut regions),
            _ => {}
        }
    }
    Ok(regions)
}

/// MERGECELLS: cmcs(2) + cmcs * Ref8(rwFirst, rwLast, colFirst, colLast)
fn parse_merge_cells(data: &[u8], regions: &mut Vec<MergedRegion>) {
    if data.len() < 2 {
        return;
    }
    let count = read_u16(data, 0) as usize;
    regions.extend(data[2..].chunks_exact(8).take(count).map(|raw| {
        MergedRegion::new(
            read_u16(raw, 0) as u32,
            read_u16(raw, 2) as u32,
            read_u16(raw, 4) as u32,
            read_u16(raw, 6) as u32,
        )
    }));
}

// ==========================================
// 小端读取
// ==========================================

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

fn to_u32s(buf: &[u8]) -> impl Iterator<Item = u32> + '_ {
    buf.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}
