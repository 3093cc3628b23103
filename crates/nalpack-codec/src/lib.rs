//! # nalpack-codec
//!
//! H.264 Annex B 码流的 NAL 单元分割与访问单元组包.
//!
//! ## 使用示例
//!
//! ```rust
//! use nalpack_codec::PacketFinder;
//!
//! let mut finder = PacketFinder::new(&[]);
//! finder.push(&[0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x1E]);
//! finder.push(&[0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x38, 0x80]);
//! finder.push(&[0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84]);
//! assert!(finder.next_packet().is_none()); // 切片尚未闭合
//!
//! finder.push(&[0x00, 0x00, 0x00, 0x01]);
//! let pkt = finder.next_packet().unwrap();
//! assert_eq!(pkt.payload().as_ref(), &[0x65, 0x88, 0x84]);
//! assert!(pkt.sps().is_some() && pkt.pps().is_some());
//! ```

pub mod packet;
pub mod parsers;

// 重导出常用类型
pub use packet::Packet;
pub use parsers::h264::{AssemblerState, FinderConfig, NalScanner, NalUnitType, PacketFinder};
