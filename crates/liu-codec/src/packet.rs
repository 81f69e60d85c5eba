//! 压缩数据包 (Packet).
//!
//! 表示一个离散的压缩数据单元, 由容器解封装或裸码流增量解析产生.

use bytes::Bytes;
use liu_core::Rational;

/// 压缩数据包
///
/// 由解析器/解封装器产生, 送入解码器消费 (所有权随之转移).
/// 一个 Packet 通常对应一个 NAL 单元或一个访问单元的压缩数据.
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 解码时间戳 (DTS)
    pub dts: i64,
    /// 数据包时长 (以 time_base 为单位)
    pub duration: i64,
    /// 时间基
    pub time_base: Rational,
    /// 所属流的索引
    pub stream_index: usize,
    /// 是否为关键帧
    pub is_keyframe: bool,
    /// 在码流中的字节偏移量 (-1 表示未知)
    pub pos: i64,
}

impl Packet {
    /// 创建空数据包 (送入解码器表示 flush)
    pub fn empty() -> Self {
        Self {
            data: Bytes::new(),
            pts: liu_core::timestamp::NOPTS_VALUE,
            dts: liu_core::timestamp::NOPTS_VALUE,
            duration: 0,
            time_base: Rational::UNDEFINED,
            stream_index: 0,
            is_keyframe: false,
            pos: -1,
        }
    }

    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Self::empty()
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包 (flush packet)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_packet_是flush包() {
        let pkt = Packet::empty();
        assert!(pkt.is_empty());
        assert_eq!(pkt.size(), 0);
        assert_eq!(pkt.pos, -1);
    }

    #[test]
    fn test_from_data() {
        let pkt = Packet::from_data(vec![1u8, 2, 3]);
        assert_eq!(pkt.size(), 3);
        assert!(!pkt.is_empty());
        assert_eq!(pkt.pts, liu_core::timestamp::NOPTS_VALUE);
    }
}
