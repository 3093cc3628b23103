//! # nalpack
//!
//! 纯 Rust 实现的 H.264 Annex B 码流组包库.
//!
//! 从原始字节流中定位 NAL 单元, 并将其组装为可解码的访问单元 (数据包),
//! 每个数据包携带最新的 SPS/PPS 和一个切片.
//!
//! # 快速开始
//!
//! ```rust
//! use nalpack::codec::PacketFinder;
//!
//! let mut finder = PacketFinder::new(&[
//!     0x00, 0x00, 0x00, 0x01, 0x67, 0x42, //
//!     0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, //
//!     0x00, 0x00, 0x00, 0x01, 0x65, 0x88, //
//!     0x00, 0x00, 0x00, 0x01,
//! ]);
//! while let Some(pkt) = finder.next_packet() {
//!     println!("{} {} 字节", pkt.nal_type(), pkt.size());
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `nalpack-core` | 错误类型与字节流缓冲区 |
//! | `nalpack-codec` | NAL 扫描器与数据包组装器 |

/// 核心类型与工具
pub use nalpack_core as core;

/// H.264 码流解析与组包
pub use nalpack_codec as codec;

/// 获取 nalpack 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
