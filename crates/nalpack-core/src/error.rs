//! 统一错误类型定义.
//!
//! 所有 nalpack crate 共用的错误类型.
//! 注意: 码流内容本身的问题 (数据不足, 起始码缺失, 未知 NAL 类型) 不会以错误形式返回,
//! 扫描与组包接口通过 `Option` 表达 "暂无结果".

use thiserror::Error;

/// nalpack 统一错误类型
#[derive(Debug, Error)]
pub enum NalError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 无效数据 (仅严格解析接口使用)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// nalpack 统一 Result 类型
pub type NalResult<T> = Result<T, NalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NalError::InvalidArgument("compact_threshold=0".into());
        assert_eq!(format!("{err}"), "无效参数: compact_threshold=0");
        let err = NalError::InvalidData("NAL 单元为空".into());
        assert_eq!(format!("{err}"), "无效数据: NAL 单元为空");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: NalError = io.into();
        assert!(matches!(err, NalError::Io(_)), "io::Error 应转换为 Io 变体");
    }
}
