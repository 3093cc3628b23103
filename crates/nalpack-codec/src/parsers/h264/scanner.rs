//! NAL 单元扫描器.
//!
//! 从字节流游标处开始, 按起始码切分出 NAL 单元. 扫描器本身不保存跨调用状态,
//! 每次都从调用方给出的游标位置重新开始, 扫描结束后通过 [`NalScanner::position`]
//! 取回新的游标.
//!
//! 单元的结束位置是下一个起始码的偏移, 尾部填充的 0 字节 (trailing_zero_8bits) 不计入单元.
//! 若尚未看到下一个起始码, 单元长度未知, 扫描器返回 `None` (数据不足), 游标停在该单元的起始码上, 待追加数据后重新扫描.

use nalpack_core::ByteStream;

use super::nal::{NalUnit, find_start_code};

/// NAL 单元扫描器
///
/// 以 `Iterator` 形式惰性产出 [`NalUnit`]; `None` 表示当前缓冲数据不足以确定下一个单元.
#[derive(Debug, Clone)]
pub struct NalScanner<'a> {
    data: &'a [u8],
    pos: usize,
    /// 缓冲区末尾是否即为码流末尾 (刷新模式)
    at_eof: bool,
}

impl<'a> NalScanner<'a> {
    /// 从 `cursor` 开始扫描, 末尾未闭合的单元不产出
    pub fn new(data: &'a [u8], cursor: usize) -> Self {
        Self {
            data,
            pos: cursor.min(data.len()),
            at_eof: false,
        }
    }

    /// 刷新模式: 缓冲区末尾视为最后一个单元的结束位置
    pub fn until_end(data: &'a [u8], cursor: usize) -> Self {
        Self {
            at_eof: true,
            ..Self::new(data, cursor)
        }
    }

    /// 在字节流当前游标处开始扫描
    pub fn for_stream(stream: &'a ByteStream) -> Self {
        Self::new(stream.as_slice(), stream.cursor())
    }

    /// 新的游标位置
    ///
    /// 总是指向下一个待处理单元的起始码 (或保持不变, 若尚未找到任何起始码).
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for NalScanner<'a> {
    type Item = NalUnit<'a>;

    fn next(&mut self) -> Option<NalUnit<'a>> {
        loop {
            // 起始码之前的填充字节直接跳过; 一个起始码都没有时游标不动
            let start_code = find_start_code(self.data, self.pos)?;
            let unit_start = start_code.payload_start();

            let end = match find_start_code(self.data, unit_start) {
                Some(next) => next.offset,
                None if self.at_eof => self.data.len(),
                None => {
                    self.pos = start_code.offset;
                    log::trace!(
                        "NalScanner: 单元未闭合, 等待更多数据, offset={}",
                        start_code.offset
                    );
                    return None;
                }
            };

            self.pos = end;
            // trailing_zero_8bits 不属于 NAL 单元; 游标仍停在下一个起始码上
            let mut unit_end = end;
            while unit_end > unit_start && self.data[unit_end - 1] == 0x00 {
                unit_end -= 1;
            }
            if unit_end == unit_start {
                // 空单元或纯填充
                if end == self.data.len() {
                    return None;
                }
                continue;
            }

            let unit = NalUnit::from_range(self.data, start_code, unit_end);
            if unit.forbidden_bit() {
                log::warn!(
                    "NalScanner: forbidden_zero_bit 已置位, offset={}, header=0x{:02X}",
                    unit.start_code_offset,
                    unit.header()
                );
            }
            log::trace!(
                "NalScanner: {} offset={} len={}",
                unit.nal_type,
                unit.start_code_offset,
                unit.len()
            );
            return Some(unit);
        }
    }
}
