//! H.264 NAL (Network Abstraction Layer) 单元基础工具.
//!
//! # Annex B 格式
//!
//! Annex B 使用起始码 (start code) 分隔 NAL 单元:
//! - 3 字节起始码: `00 00 01`
//! - 4 字节起始码: `00 00 00 01`
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```
//!
//! # 防竞争字节 (emulation prevention)
//!
//! 编码器在 `00 00` 之后、`00..=03` 之前插入 `03`, 避免负载被误认为起始码.
//! 使用负载前需要移除这些 `03`.

use nalpack_core::{NalError, NalResult};

use super::scanner::NalScanner;

/// NAL 单元类型
///
/// 组包只关心参数集与切片, 其余类型统一归入 `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 其他类型 (保留原始编号)
    Other(u8),
}

impl NalUnitType {
    /// 从 NAL 类型编号创建
    pub fn from_type_id(type_id: u8) -> Self {
        match type_id {
            1 => Self::Slice,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            _ => Self::Other(type_id),
        }
    }

    /// 从 NAL 头部字节创建 (取低 5 位)
    pub fn from_header_byte(header: u8) -> Self {
        Self::from_type_id(header & 0x1F)
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Slice => 1,
            Self::SliceIdr => 5,
            Self::Sei => 6,
            Self::Sps => 7,
            Self::Pps => 8,
            Self::Aud => 9,
            Self::Other(id) => *id,
        }
    }

    /// 是否为切片 (会闭合一个访问单元)
    pub fn is_slice(&self) -> bool {
        matches!(self, Self::Slice | Self::SliceIdr)
    }

    /// 是否为关键帧 (IDR)
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::SliceIdr)
    }

    /// 是否为参数集 (SPS/PPS)
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::Sps | Self::Pps)
    }
}

impl std::fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slice => write!(f, "Slice"),
            Self::SliceIdr => write!(f, "IDR"),
            Self::Sei => write!(f, "SEI"),
            Self::Sps => write!(f, "SPS"),
            Self::Pps => write!(f, "PPS"),
            Self::Aud => write!(f, "AUD"),
            Self::Other(id) => write!(f, "Other({id})"),
        }
    }
}

/// 起始码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCode {
    /// 起始码首字节的偏移
    pub offset: usize,
    /// 起始码长度 (3 或 4)
    pub len: usize,
}

impl StartCode {
    /// NAL 数据的起始偏移 (紧随起始码之后)
    pub fn payload_start(&self) -> usize {
        self.offset + self.len
    }
}

/// 字节流中的一个 NAL 单元视图
///
/// 仅借用缓冲区, 不复制数据; 防竞争字节尚未移除.
/// 偏移均相对于扫描时传入的缓冲区起点.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalUnit<'a> {
    /// 起始码偏移
    pub start_code_offset: usize,
    /// NAL 数据起始偏移 (含头部字节, 不含起始码)
    pub start: usize,
    /// NAL 数据结束偏移 (不含)
    pub end: usize,
    /// NAL 单元类型
    pub nal_type: NalUnitType,
    /// 原始字节 (`buffer[start..end]`)
    pub data: &'a [u8],
}

impl<'a> NalUnit<'a> {
    /// 由缓冲区区间构造, 要求 `start < end`
    pub(crate) fn from_range(buffer: &'a [u8], start_code: StartCode, end: usize) -> Self {
        let start = start_code.payload_start();
        let data = &buffer[start..end];
        Self {
            start_code_offset: start_code.offset,
            start,
            end,
            nal_type: NalUnitType::from_header_byte(data[0]),
            data,
        }
    }

    /// NAL 头部字节
    pub fn header(&self) -> u8 {
        self.data[0]
    }

    /// nal_ref_idc (参考重要性, 0-3)
    pub fn ref_idc(&self) -> u8 {
        (self.header() >> 5) & 0x03
    }

    /// forbidden_zero_bit 是否被置位
    pub fn forbidden_bit(&self) -> bool {
        self.header() & 0x80 != 0
    }

    /// 字节长度 (含头部)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空 (扫描器不会产生空单元)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 移除防竞争字节后的完整 NAL 数据 (含头部字节)
    pub fn unescape(&self) -> Vec<u8> {
        remove_emulation_prevention(self.data)
    }
}

/// 严格解析 NAL 头部字节
///
/// 扫描与组包不使用此接口 (码流问题不作为错误),
/// 供需要校验 forbidden_zero_bit 的调用方使用.
pub fn parse_nal_header(header: u8) -> NalResult<(u8, NalUnitType)> {
    let forbidden = (header >> 7) & 1;
    if forbidden != 0 {
        return Err(NalError::InvalidData(format!(
            "H.264: forbidden_zero_bit 非法, header=0x{header:02X}"
        )));
    }
    Ok(((header >> 5) & 0x03, NalUnitType::from_header_byte(header)))
}

/// 从 `from` 开始查找第一个起始码
///
/// `00 00 00 01` 与其内部的 `00 00 01` 起点不同, 取更早的 4 字节形式.
/// 4 字节形式的首个 0 必须位于 `from` 之后 (含).
pub fn find_start_code(data: &[u8], from: usize) -> Option<StartCode> {
    let mut i = from;
    while i + 2 < data.len() {
        // 第三字节 > 1 时, i..=i+2 都不可能是起始码开头
        if data[i + 2] > 0x01 {
            i += 3;
            continue;
        }
        if data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x01 {
            if i > from && data[i - 1] == 0x00 {
                return Some(StartCode {
                    offset: i - 1,
                    len: 4,
                });
            }
            return Some(StartCode { offset: i, len: 3 });
        }
        i += 1;
    }
    None
}

/// 移除防竞争字节 (`00 00 03 xx` → `00 00 xx`, 其中 `xx` ∈ `00..=03`)
///
/// `00 00 03` 之后若是 `04` 及以上, 或位于单元末尾没有后继字节, 则 `03` 为普通数据, 保留.
pub fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(data.len());
    let mut zeros = 0usize;

    for (i, &byte) in data.iter().enumerate() {
        if zeros >= 2 && byte == 0x03 {
            let escapes = data.get(i + 1).is_some_and(|&next| next <= 0x03);
            if escapes {
                zeros = 0;
                continue;
            }
        }
        rbsp.push(byte);
        zeros = if byte == 0x00 { zeros + 1 } else { 0 };
    }

    rbsp
}

/// 从完整的 Annex B 数据中分割出所有 NAL 单元
///
/// 与流式扫描不同, 缓冲区末尾视为最后一个单元的结束位置.
/// 返回的 NAL 单元不含起始码, 防竞争字节保留.
pub fn split_annex_b(data: &[u8]) -> Vec<NalUnit<'_>> {
    NalScanner::until_end(data, 0).collect()
}
