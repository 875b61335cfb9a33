// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、xlsx / xls 测试文件生成、内存工作表构造
// ==========================================

#![allow(dead_code)]

use calamine::{Data, Range};
use rust_xlsxwriter::{Format, Workbook};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use user_info_import::db::{init_schema, open_sqlite_connection};
use user_info_import::domain::Sheet;

/// 测试单元格
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// 合并区域: (first_row, first_col, last_row, last_col, 文本)
pub type Merge<'a> = (u32, u16, u32, u16, &'a str);

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写出 xlsx 测试文件
pub fn write_xlsx(
    path: &Path,
    sheet_name: &str,
    rows: &[Vec<Cell>],
    merges: &[Merge],
) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let format = Format::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(r as u32, c as u16, *text)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(r as u32, c as u16, *value)?;
                    }
                    Cell::Blank => {}
                }
            }
        }

        for (first_row, first_col, last_row, last_col, text) in merges {
            worksheet.merge_range(*first_row, *first_col, *last_row, *last_col, text, &format)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// 在临时目录下写出 xlsx，返回文件路径
pub fn temp_xlsx(
    dir: &TempDir,
    file_name: &str,
    sheet_name: &str,
    rows: &[Vec<Cell>],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join(file_name);
    write_xlsx(&path, sheet_name, rows, &[])?;
    Ok(path)
}

// ==========================================
// xls (BIFF8) 测试文件
// ==========================================
// 结构: v3 OLE 复合文档，512 字节扇区
//   扇区 0..n   Workbook 流（补齐到 4096 字节，避开 mini stream）
//   扇区 n      目录
//   扇区 n + 1  FAT
// ==========================================

const END_OF_CHAIN: u32 = 0xFFFF_FFFE;
const FAT_SECT: u32 = 0xFFFF_FFFD;
const FREE_SECT: u32 = 0xFFFF_FFFF;
const SECTOR: usize = 512;

/// 写出单 sheet 的 xls 测试文件；合并区域文本写在左上角单元格
pub fn write_xls(
    path: &Path,
    sheet_name: &str,
    rows: &[Vec<Cell>],
    merges: &[Merge],
) -> Result<(), Box<dyn Error>> {
    fs::write(path, compound_file(&workbook_stream(sheet_name, rows, merges)))?;
    Ok(())
}

fn biff_record(out: &mut Vec<u8>, typ: u16, data: &[u8]) {
    out.extend_from_slice(&typ.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn biff_bof(dt: u16) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    data[..2].copy_from_slice(&0x0600u16.to_le_bytes());
    data[2..4].copy_from_slice(&dt.to_le_bytes());
    data
}

fn utf16_le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn workbook_stream(sheet_name: &str, rows: &[Vec<Cell>], merges: &[Merge]) -> Vec<u8> {
    // 全局子流: BOF + BOUNDSHEET + EOF
    let mut stream = Vec::new();
    biff_record(&mut stream, 0x0809, &biff_bof(0x0005));

    let bound_sheet_at = stream.len();
    let mut bound_sheet = vec![0u8; 4];
    bound_sheet.extend_from_slice(&[0, 0, sheet_name.encode_utf16().count() as u8, 1]);
    bound_sheet.extend(utf16_le(sheet_name));
    biff_record(&mut stream, 0x0085, &bound_sheet);
    biff_record(&mut stream, 0x000A, &[]);

    let sheet_at = stream.len() as u32;
    stream[bound_sheet_at + 4..bound_sheet_at + 8].copy_from_slice(&sheet_at.to_le_bytes());

    // 单元格按行优先排序写出
    let mut cells: Vec<(u32, u16, Cell)> = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !matches!(cell, Cell::Blank) {
                cells.push((r as u32, c as u16, *cell));
            }
        }
    }
    for (first_row, first_col, _, _, text) in merges {
        cells.retain(|(r, c, _)| (*r, *c) != (*first_row, *first_col));
        cells.push((*first_row, *first_col, Cell::Text(*text)));
    }
    cells.sort_by_key(|(r, c, _)| (*r, *c));

    // sheet 子流: BOF + DIMENSIONS + 单元格 + MERGECELLS + EOF
    biff_record(&mut stream, 0x0809, &biff_bof(0x0010));

    let mut dimensions = Vec::new();
    let last_row = cells.iter().map(|(r, _, _)| *r + 1).max().unwrap_or(0);
    let last_col = cells.iter().map(|(_, c, _)| *c + 1).max().unwrap_or(0);
    dimensions.extend_from_slice(&0u32.to_le_bytes());
    dimensions.extend_from_slice(&last_row.to_le_bytes());
    dimensions.extend_from_slice(&0u16.to_le_bytes());
    dimensions.extend_from_slice(&last_col.to_le_bytes());
    dimensions.extend_from_slice(&0u16.to_le_bytes());
    biff_record(&mut stream, 0x0200, &dimensions);

    for (row, col, cell) in &cells {
        let mut data = Vec::new();
        data.extend_from_slice(&(*row as u16).to_le_bytes());
        data.extend_from_slice(&col.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        match cell {
            Cell::Text(text) => {
                // LABEL: XLUnicodeString，未压缩 UTF-16
                data.extend_from_slice(&(text.encode_utf16().count() as u16).to_le_bytes());
                data.push(1);
                data.extend(utf16_le(text));
                biff_record(&mut stream, 0x0204, &data);
            }
            Cell::Number(value) => {
                data.extend_from_slice(&value.to_le_bytes());
                biff_record(&mut stream, 0x0203, &data);
            }
            Cell::Blank => {}
        }
    }

    if !merges.is_empty() {
        let mut data = (merges.len() as u16).to_le_bytes().to_vec();
        for (first_row, first_col, last_row, last_col, _) in merges {
            data.extend_from_slice(&(*first_row as u16).to_le_bytes());
            data.extend_from_slice(&(*last_row as u16).to_le_bytes());
            data.extend_from_slice(&first_col.to_le_bytes());
            data.extend_from_slice(&last_col.to_le_bytes());
        }
        biff_record(&mut stream, 0x00E5, &data);
    }

    biff_record(&mut stream, 0x000A, &[]);
    stream
}

fn compound_file(stream: &[u8]) -> Vec<u8> {
    let stream_len = stream.len().max(4096);
    let stream_sectors = stream_len.div_ceil(SECTOR);
    let dir_sector = stream_sectors as u32;
    let fat_sector = dir_sector + 1;

    // 头部
    let mut header = vec![0u8; SECTOR];
    header[..8].copy_from_slice(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
    header[24..26].copy_from_slice(&0x003Eu16.to_le_bytes());
    header[26..28].copy_from_slice(&3u16.to_le_bytes());
    header[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
    header[30..32].copy_from_slice(&9u16.to_le_bytes());
    header[32..34].copy_from_slice(&6u16.to_le_bytes());
    header[44..48].copy_from_slice(&1u32.to_le_bytes());
    header[48..52].copy_from_slice(&dir_sector.to_le_bytes());
    header[56..60].copy_from_slice(&4096u32.to_le_bytes());
    header[60..64].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
    header[68..72].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
    header[76..80].copy_from_slice(&fat_sector.to_le_bytes());
    for slot in header[80..].chunks_exact_mut(4) {
        slot.copy_from_slice(&FREE_SECT.to_le_bytes());
    }

    // Workbook 流
    let mut body = stream.to_vec();
    body.resize(stream_sectors * SECTOR, 0);

    // 目录: Root Entry + Workbook + 两个空项
    let mut directory = vec![0u8; SECTOR];
    write_dir_entry(&mut directory[..128], "Root Entry", 5, 1, END_OF_CHAIN, 0);
    write_dir_entry(&mut directory[128..256], "Workbook", 2, FREE_SECT, 0, stream_len as u32);
    for empty in directory[256..].chunks_exact_mut(128) {
        for at in [68, 72, 76] {
            empty[at..at + 4].copy_from_slice(&FREE_SECT.to_le_bytes());
        }
    }

    // FAT
    let mut fat = vec![FREE_SECT; SECTOR / 4];
    for id in 0..stream_sectors {
        fat[id] = if id + 1 == stream_sectors {
            END_OF_CHAIN
        } else {
            id as u32 + 1
        };
    }
    fat[dir_sector as usize] = END_OF_CHAIN;
    fat[fat_sector as usize] = FAT_SECT;

    let mut bytes = header;
    bytes.extend(body);
    bytes.extend(directory);
    bytes.extend(fat.iter().flat_map(|id| id.to_le_bytes()));
    bytes
}

fn write_dir_entry(entry: &mut [u8], name: &str, kind: u8, child: u32, start: u32, size: u32) {
    let name_bytes = utf16_le(name);
    entry[..name_bytes.len()].copy_from_slice(&name_bytes);
    entry[64..66].copy_from_slice(&((name_bytes.len() + 2) as u16).to_le_bytes());
    entry[66] = kind;
    entry[67] = 1;
    entry[68..72].copy_from_slice(&FREE_SECT.to_le_bytes());
    entry[72..76].copy_from_slice(&FREE_SECT.to_le_bytes());
    entry[76..80].copy_from_slice(&child.to_le_bytes());
    entry[116..120].copy_from_slice(&start.to_le_bytes());
    entry[120..124].copy_from_slice(&size.to_le_bytes());
}

/// 标准表头
pub fn header_row() -> Vec<Cell<'static>> {
    vec![
        Cell::Text("Name"),
        Cell::Text("Age"),
        Cell::Text("Address"),
        Cell::Text("Phone"),
    ]
}

/// 标准两行数据（Ann / Bo）
pub fn ann_and_bo() -> Vec<Vec<Cell<'static>>> {
    vec![
        header_row(),
        vec![
            Cell::Text("Ann"),
            Cell::Number(30.0),
            Cell::Text("X St"),
            Cell::Number(1234567.0),
        ],
        vec![
            Cell::Text("Bo"),
            Cell::Number(41.0),
            Cell::Text("Y Rd"),
            Cell::Text("7654321"),
        ],
    ]
}

/// 由文本二维数组构造内存工作表（空串为未写入单元格）
pub fn sheet_from_rows(name: &str, rows: &[&[&str]]) -> Sheet {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1);
    let mut range = Range::new((0, 0), (rows.len().max(1) as u32 - 1, width as u32 - 1));
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                range.set_value((r as u32, c as u32), Data::String(value.to_string()));
            }
        }
    }
    Sheet::new(name, range)
}
