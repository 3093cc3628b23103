//! 访问单元数据包 (Packet).
//!
//! 一个切片 NAL 单元连同组包时最新的 SPS/PPS, 可直接送入下游解码/编码会话.

use bytes::Bytes;

use crate::parsers::h264::NalUnitType;

/// 访问单元数据包
///
/// 所有字节序列均为完整 NAL 单元 (含 1 字节头部, 不含起始码, 已移除防竞争字节).
/// 数据包独立持有数据, 构造后不可变, 生命周期不受字节流压缩影响.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    sps: Option<Bytes>,
    pps: Option<Bytes>,
    payload: Bytes,
    nal_type: NalUnitType,
    offset: u64,
}

impl Packet {
    /// 创建数据包
    ///
    /// # Panics
    ///
    /// `payload` 为空时 panic; 切片单元至少包含头部字节.
    pub fn new(
        sps: Option<Bytes>,
        pps: Option<Bytes>,
        payload: Bytes,
        nal_type: NalUnitType,
        offset: u64,
    ) -> Self {
        assert!(!payload.is_empty(), "Packet: payload 不能为空");
        Self {
            sps,
            pps,
            payload,
            nal_type,
            offset,
        }
    }

    /// 组包时最新的序列参数集
    pub fn sps(&self) -> Option<&Bytes> {
        self.sps.as_ref()
    }

    /// 组包时最新的图像参数集
    pub fn pps(&self) -> Option<&Bytes> {
        self.pps.as_ref()
    }

    /// 切片数据
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// 切片类型 (IDR 或非 IDR)
    pub fn nal_type(&self) -> NalUnitType {
        self.nal_type
    }

    /// 是否为关键帧
    pub fn is_keyframe(&self) -> bool {
        self.nal_type.is_idr()
    }

    /// 切片起始码在整个码流中的绝对偏移
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 切片数据大小 (字节)
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// 拆分为 (sps, pps, payload)
    pub fn into_parts(self) -> (Option<Bytes>, Option<Bytes>, Bytes) {
        (self.sps, self.pps, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_accessors() {
        let pkt = Packet::new(
            Some(Bytes::from_static(&[0x67, 0x42])),
            None,
            Bytes::from_static(&[0x65, 0x88]),
            NalUnitType::SliceIdr,
            42,
        );
        assert_eq!(pkt.sps().map(|b| b.as_ref()), Some(&[0x67, 0x42][..]));
        assert!(pkt.pps().is_none());
        assert!(pkt.is_keyframe());
        assert_eq!(pkt.size(), 2);
        assert_eq!(pkt.offset(), 42);

        let (sps, pps, payload) = pkt.into_parts();
        assert!(sps.is_some());
        assert!(pps.is_none());
        assert_eq!(payload.as_ref(), &[0x65, 0x88]);
    }

    #[test]
    #[should_panic(expected = "payload 不能为空")]
    fn test_packet_empty_payload_panics() {
        let _ = Packet::new(None, None, Bytes::new(), NalUnitType::Slice, 0);
    }
}
