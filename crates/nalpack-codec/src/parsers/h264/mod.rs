//! H.264/AVC Annex B 码流解析.
//!
//! - NAL 单元类型识别、起始码查找、防竞争字节移除
//! - NAL 扫描器: 按起始码惰性切分, 支持增量输入
//! - 访问单元组装器: 参数集 + 切片 → 数据包
//! - 数据包查找会话: 持有字节流与组装器状态

pub mod assembler;
pub mod finder;
pub mod nal;
pub mod scanner;

pub use assembler::{AssemblerPhase, AssemblerState, flush_packet, next_packet};
pub use finder::{DEFAULT_COMPACT_THRESHOLD, FinderConfig, PacketFinder};
pub use nal::{
    NalUnit, NalUnitType, StartCode, find_start_code, parse_nal_header,
    remove_emulation_prevention, split_annex_b,
};
pub use scanner::NalScanner;
