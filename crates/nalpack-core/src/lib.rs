//! # nalpack-core
//!
//! nalpack 核心库, 提供统一错误类型和追加式字节流缓冲区.

pub mod byte_stream;
pub mod error;

// 重导出常用类型
pub use byte_stream::ByteStream;
pub use error::{NalError, NalResult};
