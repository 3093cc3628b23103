//! 追加式字节流缓冲区.
//!
//! 调用方不断追加新到达的字节, 解析器通过读游标标记已消费的位置.
//! 游标之前的字节视为已消费, 可通过 [`ByteStream::compact`] 丢弃.
//!
//! ```text
//!  已消费 (可压缩)      未消费 (待扫描)
//! ┌───────────────┬───────────────────────┐
//! │ 0 .. cursor   │ cursor .. len         │  ← append 追加到尾部
//! └───────────────┴───────────────────────┘
//! ```

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::NalResult;

/// 追加式字节流
///
/// 不变量: `cursor <= len`. 游标只前进, 不后退.
#[derive(Debug, Default)]
pub struct ByteStream {
    /// 缓冲数据 (含已消费前缀)
    buf: BytesMut,
    /// 读游标 (相对 `buf` 起点)
    cursor: usize,
    /// 已被压缩丢弃的字节数, 用于计算绝对偏移
    discarded: u64,
}

impl ByteStream {
    /// 创建空字节流
    pub fn new() -> Self {
        Self::default()
    }

    /// 以初始数据创建字节流 (可为空)
    pub fn from_slice(initial: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(initial),
            cursor: 0,
            discarded: 0,
        }
    }

    /// 追加新到达的字节
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// 从 reader 读取最多 `max` 字节并追加, 返回实际读取的字节数 (0 表示 EOF)
    pub fn fill_from<R: Read>(&mut self, reader: &mut R, max: usize) -> NalResult<usize> {
        let start = self.buf.len();
        self.buf.resize(start + max, 0);
        let result = loop {
            match reader.read(&mut self.buf[start..]) {
                Ok(n) => break Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        match result {
            Ok(n) => {
                self.buf.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                self.buf.truncate(start);
                Err(e.into())
            }
        }
    }

    /// 缓冲区全部数据 (含已消费前缀)
    ///
    /// 扫描器使用绝对于缓冲区起点的下标, 因此需要完整视图.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// 尚未消费的数据
    pub fn unconsumed(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    /// 缓冲区长度 (含已消费前缀)
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 读游标位置
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 未消费字节数
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// 游标在整个流中的绝对偏移 (跨越压缩)
    pub fn consumed_total(&self) -> u64 {
        self.discarded + self.cursor as u64
    }

    /// 缓冲区起点在整个流中的绝对偏移
    pub fn base_offset(&self) -> u64 {
        self.discarded
    }

    /// 将游标前移到 `pos`
    ///
    /// # Panics
    ///
    /// `pos` 超出缓冲区长度或小于当前游标时 panic (调用约定被破坏).
    pub fn advance_to(&mut self, pos: usize) {
        assert!(
            pos >= self.cursor && pos <= self.buf.len(),
            "ByteStream: 游标越界, cursor={}, pos={}, len={}",
            self.cursor,
            pos,
            self.buf.len()
        );
        self.cursor = pos;
    }

    /// 丢弃已消费前缀, 游标归零
    pub fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.buf.advance(self.cursor);
        self.discarded += self.cursor as u64;
        log::trace!(
            "ByteStream: 压缩 {} 字节, 剩余 {} 字节",
            self.cursor,
            self.buf.len()
        );
        self.cursor = 0;
    }

    /// 丢弃全部缓冲数据 (如 seek 后), 绝对偏移继续累计
    pub fn clear(&mut self) {
        self.discarded += self.buf.len() as u64;
        self.buf.clear();
        self.cursor = 0;
    }
}
