//! 访问单元组装器.
//!
//! 从扫描器逐个拉取 NAL 单元:
//! - SPS/PPS: 移除防竞争字节后保存到 [`AssemblerState`], 继续拉取
//! - SEI/AUD/其他: 跳过
//! - 切片 (IDR/非 IDR): 作为 payload, 与当前 SPS/PPS 组成 [`Packet`]
//!
//! 数据不足时返回 `None`, 已处理的参数集保留在状态中, 游标停在扫描器留下的位置,
//! 因此追加数据后重试不会重复处理任何字节.
//!
//! # 状态机 (每次调用)
//! ```text
//! Idle ──拉取到单元──▶ Accumulating ──切片──▶ Complete
//!   │                      │
//!   └──────数据不足────────┴──────────────▶ Waiting
//! ```

use bytes::Bytes;
use nalpack_core::ByteStream;

use super::nal::NalUnitType;
use super::scanner::NalScanner;
use crate::Packet;

/// 组装器在最近一次调用中到达的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblerPhase {
    /// 本次调用尚未拉取任何单元
    #[default]
    Idle,
    /// 已拉取单元, 尚未遇到切片
    Accumulating,
    /// 已组装出数据包
    Complete,
    /// 扫描器数据不足
    Waiting,
}

/// 组装器状态 (每条码流一个)
///
/// 跨调用保存最新的参数集; 只有 [`AssemblerState::reset`] 会清除.
#[derive(Debug, Clone, Default)]
pub struct AssemblerState {
    last_sps: Option<Bytes>,
    last_pps: Option<Bytes>,
    /// 等待中的单元起始码的绝对偏移
    pending_offset: Option<u64>,
    phase: AssemblerPhase,
}

impl AssemblerState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次看到的 SPS
    pub fn last_sps(&self) -> Option<&Bytes> {
        self.last_sps.as_ref()
    }

    /// 最近一次看到的 PPS
    pub fn last_pps(&self) -> Option<&Bytes> {
        self.last_pps.as_ref()
    }

    /// 数据不足时, 待闭合单元起始码的绝对偏移
    pub fn pending_offset(&self) -> Option<u64> {
        self.pending_offset
    }

    /// 最近一次调用到达的阶段
    pub fn phase(&self) -> AssemblerPhase {
        self.phase
    }

    /// 码流不连续 (如 seek) 时清除全部状态
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 组装下一个数据包
///
/// 返回 `None` 表示当前缓冲数据不足, 调用方应追加数据后重试.
pub fn next_packet(stream: &mut ByteStream, state: &mut AssemblerState) -> Option<Packet> {
    assemble(stream, state, false)
}

/// 在码流结束后组装数据包
///
/// 缓冲区末尾视为最后一个单元的结束位置. 只应在确认不会再有数据到达后调用.
pub fn flush_packet(stream: &mut ByteStream, state: &mut AssemblerState) -> Option<Packet> {
    assemble(stream, state, true)
}

fn assemble(stream: &mut ByteStream, state: &mut AssemblerState, at_eof: bool) -> Option<Packet> {
    state.phase = AssemblerPhase::Idle;
    let base = stream.base_offset();

    let (packet, position) = {
        let mut scanner = if at_eof {
            NalScanner::until_end(stream.as_slice(), stream.cursor())
        } else {
            NalScanner::for_stream(stream)
        };

        let mut packet = None;
        for unit in scanner.by_ref() {
            state.phase = AssemblerPhase::Accumulating;
            match unit.nal_type {
                NalUnitType::Sps => {
                    let sps = Bytes::from(unit.unescape());
                    log::debug!("H.264: 更新 SPS, len={}", sps.len());
                    state.last_sps = Some(sps);
                }
                NalUnitType::Pps => {
                    let pps = Bytes::from(unit.unescape());
                    log::debug!("H.264: 更新 PPS, len={}", pps.len());
                    state.last_pps = Some(pps);
                }
                nal_type if nal_type.is_slice() => {
                    let offset = base + unit.start_code_offset as u64;
                    packet = Some(Packet::new(
                        state.last_sps.clone(),
                        state.last_pps.clone(),
                        Bytes::from(unit.unescape()),
                        nal_type,
                        offset,
                    ));
                    break;
                }
                nal_type => {
                    log::trace!("H.264: 跳过 {} 单元, len={}", nal_type, unit.len());
                }
            }
        }
        (packet, scanner.position())
    };

    stream.advance_to(position);

    match packet {
        Some(pkt) => {
            state.phase = AssemblerPhase::Complete;
            state.pending_offset = None;
            log::debug!(
                "H.264: 输出数据包, type={}, offset={}, size={}, sps={}, pps={}",
                pkt.nal_type(),
                pkt.offset(),
                pkt.size(),
                pkt.sps().is_some(),
                pkt.pps().is_some()
            );
            Some(pkt)
        }
        None => {
            state.phase = AssemblerPhase::Waiting;
            state.pending_offset = (stream.remaining() > 0).then(|| stream.consumed_total());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(start_code: &[u8], body: &[u8]) -> Vec<u8> {
        let mut out = start_code.to_vec();
        out.extend_from_slice(body);
        out
    }

    const SC4: &[u8] = &[0x00, 0x00, 0x00, 0x01];
    const SC3: &[u8] = &[0x00, 0x00, 0x01];

    #[test]
    fn test_basic_sps_pps_idr() {
        let mut data = Vec::new();
        data.extend(unit(SC4, &[0x67, 0x42, 0x00, 0x1E]));
        data.extend(unit(SC4, &[0x68, 0xCE, 0x38, 0x80]));
        data.extend(unit(SC4, &[0x65, 0x88, 0x84]));
        data.extend_from_slice(SC4);

        let mut stream = ByteStream::from_slice(&data);
        let mut state = AssemblerState::new();

        let pkt = next_packet(&mut stream, &mut state).expect("应组装出一个数据包");
        assert_eq!(pkt.sps().unwrap().as_ref(), &[0x67, 0x42, 0x00, 0x1E]);
        assert_eq!(pkt.pps().unwrap().as_ref(), &[0x68, 0xCE, 0x38, 0x80]);
        assert_eq!(pkt.payload().as_ref(), &[0x65, 0x88, 0x84]);
        assert!(pkt.is_keyframe());
        assert_eq!(pkt.offset(), 16);
        assert_eq!(state.phase(), AssemblerPhase::Complete);

        assert!(next_packet(&mut stream, &mut state).is_none());
        assert_eq!(state.phase(), AssemblerPhase::Waiting);
    }

    #[test]
    fn test_parameter_sets_survive_none() {
        let mut stream = ByteStream::new();
        let mut state = AssemblerState::new();

        stream.append(&unit(SC3, &[0x67, 0xAA]));
        stream.append(&unit(SC3, &[0x68, 0xBB]));
        stream.append(SC3);
        assert!(next_packet(&mut stream, &mut state).is_none());
        assert_eq!(state.last_sps().unwrap().as_ref(), &[0x67, 0xAA]);
        assert_eq!(state.last_pps().unwrap().as_ref(), &[0x68, 0xBB]);
        assert_eq!(stream.cursor(), 10, "参数集已消费, 游标应停在末尾起始码");
        assert_eq!(state.pending_offset(), Some(10));

        stream.append(&[0x41, 0x9A]);
        stream.append(SC3);
        let pkt = next_packet(&mut stream, &mut state).expect("追加切片后应输出数据包");
        assert_eq!(pkt.sps().unwrap().as_ref(), &[0x67, 0xAA]);
        assert_eq!(pkt.payload().as_ref(), &[0x41, 0x9A]);
        assert!(!pkt.is_keyframe());
    }

    #[test]
    fn test_skips_sei_and_aud() {
        let mut data = Vec::new();
        data.extend(unit(SC3, &[0x09, 0xF0]));
        data.extend(unit(SC3, &[0x06, 0x05, 0x01, 0x80]));
        data.extend(unit(SC3, &[0x41, 0x01]));
        data.extend_from_slice(SC3);

        let mut stream = ByteStream::from_slice(&data);
        let mut state = AssemblerState::new();
        let pkt = next_packet(&mut stream, &mut state).unwrap();
        assert_eq!(pkt.payload().as_ref(), &[0x41, 0x01]);
        assert!(pkt.sps().is_none(), "未见过 SPS 时不应携带");
        assert!(pkt.pps().is_none());
    }

    #[test]
    fn test_payload_emulation_removed() {
        let mut data = unit(SC4, &[0x65, 0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x03]);
        data.extend_from_slice(SC4);

        let mut stream = ByteStream::from_slice(&data);
        let mut state = AssemblerState::new();
        let pkt = next_packet(&mut stream, &mut state).unwrap();
        assert_eq!(
            pkt.payload().as_ref(),
            &[0x65, 0x00, 0x00, 0x01, 0x00, 0x00, 0x03]
        );
    }

    #[test]
    fn test_packet_snapshot_not_affected_by_later_sps() {
        let mut data = Vec::new();
        data.extend(unit(SC3, &[0x67, 0x01]));
        data.extend(unit(SC3, &[0x65, 0x10]));
        data.extend(unit(SC3, &[0x67, 0x02]));
        data.extend(unit(SC3, &[0x41, 0x20]));
        data.extend_from_slice(SC3);

        let mut stream = ByteStream::from_slice(&data);
        let mut state = AssemblerState::new();
        let first = next_packet(&mut stream, &mut state).unwrap();
        let second = next_packet(&mut stream, &mut state).unwrap();
        assert_eq!(first.sps().unwrap().as_ref(), &[0x67, 0x01]);
        assert_eq!(second.sps().unwrap().as_ref(), &[0x67, 0x02]);
    }

    #[test]
    fn test_flush_yields_trailing_slice() {
        let mut data = unit(SC4, &[0x67, 0x42]);
        data.extend(unit(SC4, &[0x65, 0xAB, 0xCD]));

        let mut stream = ByteStream::from_slice(&data);
        let mut state = AssemblerState::new();
        assert!(next_packet(&mut stream, &mut state).is_none());

        let pkt = flush_packet(&mut stream, &mut state).expect("刷新应输出末尾切片");
        assert_eq!(pkt.payload().as_ref(), &[0x65, 0xAB, 0xCD]);
        assert_eq!(stream.remaining(), 0);
        assert!(flush_packet(&mut stream, &mut state).is_none());
        assert_eq!(state.pending_offset(), None);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut stream = ByteStream::from_slice(&unit(SC3, &[0x67, 0x42]));
        stream.append(SC3);
        let mut state = AssemblerState::new();
        assert!(next_packet(&mut stream, &mut state).is_none());
        assert!(state.last_sps().is_some());

        state.reset();
        assert!(state.last_sps().is_none());
        assert!(state.last_pps().is_none());
        assert_eq!(state.pending_offset(), None);
        assert_eq!(state.phase(), AssemblerPhase::Idle);
    }
}
