//! 数据包查找会话.
//!
//! [`PacketFinder`] 持有一条码流的 [`ByteStream`] 与 [`AssemblerState`],
//! 调用方循环执行 "追加数据 → 反复 `next_packet` 直到 `None`".

use nalpack_core::{ByteStream, NalError, NalResult};
use serde::{Deserialize, Serialize};

use super::assembler::{self, AssemblerState};
use crate::Packet;

/// 默认压缩阈值: 已消费前缀达到 64 KiB 时压缩缓冲区
pub const DEFAULT_COMPACT_THRESHOLD: usize = 64 * 1024;

/// 查找会话配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FinderConfig {
    /// 已消费字节数达到该值时, 在下一次组包前压缩缓冲区
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold: usize,
}

fn default_compact_threshold() -> usize {
    DEFAULT_COMPACT_THRESHOLD
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
        }
    }
}

impl FinderConfig {
    /// 校验配置
    pub fn validate(&self) -> NalResult<()> {
        if self.compact_threshold == 0 {
            return Err(NalError::InvalidArgument(
                "compact_threshold 必须大于 0".into(),
            ));
        }
        Ok(())
    }
}

/// 数据包查找会话
#[derive(Debug, Default)]
pub struct PacketFinder {
    stream: ByteStream,
    state: AssemblerState,
    config: FinderConfig,
}

impl PacketFinder {
    /// 以初始数据 (可为空) 创建会话
    pub fn new(initial: &[u8]) -> Self {
        Self {
            stream: ByteStream::from_slice(initial),
            state: AssemblerState::new(),
            config: FinderConfig::default(),
        }
    }

    /// 以指定配置创建会话
    pub fn with_config(initial: &[u8], config: FinderConfig) -> NalResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(initial)
        })
    }

    /// 追加新到达的字节
    pub fn push(&mut self, data: &[u8]) {
        self.stream.append(data);
    }

    /// 获取下一个数据包, `None` 表示需要更多数据
    pub fn next_packet(&mut self) -> Option<Packet> {
        if self.stream.cursor() >= self.config.compact_threshold {
            self.stream.compact();
        }
        assembler::next_packet(&mut self.stream, &mut self.state)
    }

    /// 取出当前数据能组装出的全部数据包
    pub fn packets(&mut self) -> impl Iterator<Item = Packet> + '_ {
        std::iter::from_fn(move || self.next_packet())
    }

    /// 码流结束: 将缓冲区末尾视为最后一个单元的结束, 取出剩余数据包
    pub fn flush(&mut self) -> Vec<Packet> {
        let mut packets: Vec<Packet> = self.packets().collect();
        while let Some(pkt) = assembler::flush_packet(&mut self.stream, &mut self.state) {
            packets.push(pkt);
        }
        packets
    }

    /// 码流不连续 (如 seek): 丢弃缓冲数据与参数集
    pub fn reset(&mut self) {
        self.stream.clear();
        self.state.reset();
    }

    /// 缓冲区中尚未消费的字节数
    pub fn buffered_len(&self) -> usize {
        self.stream.remaining()
    }

    /// 组装器状态
    pub fn state(&self) -> &AssemblerState {
        &self.state
    }

    /// 底层字节流
    pub fn stream(&self) -> &ByteStream {
        &self.stream
    }

    /// 底层字节流 (可变, 用于 [`ByteStream::fill_from`] 等直接填充)
    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    /// 会话配置
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }
}
