//! H.264 Annex B 裸码流增量解析器.
//!
//! 输入以任意大小的数据块到达, 解析器在内部缓冲区中累积字节,
//! 以起始码位置作为数据包边界:
//!
//! - 每个数据包从一个起始码开始 (4 字节起始码保持完整),
//!   延伸到下一个起始码之前;
//! - 最后一个 (可能不完整的) NAL 停留在缓冲区中, 直到 `flush()`;
//! - 第一个起始码之前的前导字节归入第一个数据包, 保证不丢字节;
//! - 整条码流中找不到任何起始码时, 在 `flush()` 时报 `InvalidData`
//!   (硬失败, 不做重同步).
//!
//! 数据包切分只取决于字节内容: 同一码流无论按何种块大小送入,
//! 产出的数据包序列完全一致.

pub mod nal;

use bytes::{Bytes, BytesMut};
use log::{debug, trace};

use liu_core::{LiuError, LiuResult};

use crate::codec_id::CodecId;
use crate::packet::Packet;
use crate::parser::Parser;

pub use nal::{NalUnit, NalUnitType};

/// H.264 Annex B 增量解析器
pub struct H264Parser {
    /// 尚未切分的缓冲数据
    buf: BytesMut,
    /// 缓冲区内已确认的数据包边界 (起始码位置), 严格递增
    boundaries: Vec<usize>,
    /// 扫描恢复位置: [0, scan_pos) 内不会再出现新的起始码
    scan_pos: usize,
    /// 整条码流中已见到的起始码总数
    start_code_count: u64,
    /// 已产出数据包占用的码流字节偏移
    base_offset: u64,
    /// 是否已 flush (终态)
    flushed: bool,
}

impl H264Parser {
    /// 创建解析器
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            boundaries: Vec::new(),
            scan_pos: 0,
            start_code_count: 0,
            base_offset: 0,
            flushed: false,
        }
    }

    /// 创建解析器实例 (工厂函数)
    pub fn create() -> LiuResult<Box<dyn Parser>> {
        Ok(Box::new(Self::new()))
    }

    /// 扫描缓冲区中新到达的起始码, 记录数据包边界
    ///
    /// 3 字节起始码 `00 00 01` 为边界锚点; 如果前一个字节是 0x00,
    /// 将边界前移一位, 使 4 字节起始码 `00 00 00 01` 保持完整.
    fn scan_start_codes(&mut self) {
        let data = &self.buf[..];
        let mut i = self.scan_pos;

        while i + 3 <= data.len() {
            if data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x01 {
                let mut b = i;
                if b > 0 && data[b - 1] == 0x00 {
                    b -= 1;
                }
                if self.boundaries.last().is_none_or(|&last| b > last) {
                    self.boundaries.push(b);
                    self.start_code_count += 1;
                }
                i += 3;
            } else {
                i += 1;
            }
        }

        // 起始码可能跨块: 末尾 2 字节留到下一轮重扫
        self.scan_pos = data.len().saturating_sub(2);
    }

    /// 产出所有已完整的数据包 (每个数据包的结束边界均已确认)
    fn drain_complete_packets(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();
        while self.boundaries.len() >= 2 {
            let cut = self.boundaries[1];
            packets.push(self.cut_packet(cut));
        }
        packets
    }

    /// 在 `cut` 处切下一个数据包, 并平移缓冲区内坐标
    fn cut_packet(&mut self, cut: usize) -> Packet {
        let head = self.buf.split_to(cut).freeze();

        self.boundaries.remove(0);
        for b in &mut self.boundaries {
            *b -= cut;
        }
        self.scan_pos -= cut;

        let packet = self.make_packet(head);
        self.base_offset += cut as u64;
        packet
    }

    /// 用切下的字节构造数据包, 从 NAL 头部提取关键帧标记
    fn make_packet(&self, data: Bytes) -> Packet {
        let nalu = nal::first_nal(&data);
        let is_keyframe = nalu.is_some_and(|n| n.nal_type.is_idr());
        if let Some(n) = nalu {
            trace!(
                "H.264: 产出数据包 type={}, ref_idc={}, size={}, pos={}",
                n.nal_type,
                n.ref_idc,
                data.len(),
                self.base_offset
            );
        }

        Packet {
            pos: self.base_offset as i64,
            is_keyframe,
            ..Packet::from_data(data)
        }
    }
}

impl Default for H264Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for H264Parser {
    fn codec_id(&self) -> CodecId {
        CodecId::H264
    }

    fn name(&self) -> &str {
        "h264"
    }

    fn parse(&mut self, chunk: &[u8]) -> LiuResult<Vec<Packet>> {
        if self.flushed {
            return Err(LiuError::ParserFlushed);
        }
        // 空块是无操作; 码流结束由显式 flush() 表示
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        self.buf.extend_from_slice(chunk);
        self.scan_start_codes();
        Ok(self.drain_complete_packets())
    }

    fn flush(&mut self) -> LiuResult<Vec<Packet>> {
        if self.flushed {
            return Ok(Vec::new());
        }
        self.flushed = true;

        if self.buf.is_empty() {
            return Ok(Vec::new());
        }
        if self.start_code_count == 0 {
            return Err(LiuError::InvalidData(
                "H.264: 码流中未找到起始码".into(),
            ));
        }

        // 缓冲区剩余部分作为最后一个数据包产出
        let cut = self.buf.len();
        let head = self.buf.split_to(cut).freeze();
        self.boundaries.clear();
        self.scan_pos = 0;

        let packet = self.make_packet(head);
        self.base_offset += cut as u64;
        debug!("H.264: flush 产出尾部数据包, size={}", cut);
        Ok(vec![packet])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造典型的 Annex B 码流 (SPS + PPS + IDR + P slice)
    fn build_typical_annex_b() -> Vec<u8> {
        let mut data = Vec::new();

        // SPS (4字节起始码)
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        data.extend_from_slice(&[0x67, 0x42, 0x00, 0x1E, 0xAB, 0xCD]);

        // PPS (3字节起始码)
        data.extend_from_slice(&[0x00, 0x00, 0x01]);
        data.extend_from_slice(&[0x68, 0xCE, 0x38, 0x80]);

        // IDR 切片 (4字节起始码)
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        data.extend_from_slice(&[0x65, 0x88, 0x80, 0x40, 0x00, 0xFF, 0xFE]);

        // P 切片 (3字节起始码)
        data.extend_from_slice(&[0x00, 0x00, 0x01]);
        data.extend_from_slice(&[0x41, 0x9A, 0x01, 0x02, 0x03]);

        data
    }

    /// 按给定块大小送入全部数据并 flush, 收集所有数据包
    fn parse_in_chunks(data: &[u8], chunk_size: usize) -> Vec<Packet> {
        let mut parser = H264Parser::new();
        let mut packets = Vec::new();
        for chunk in data.chunks(chunk_size.max(1)) {
            packets.extend(parser.parse(chunk).unwrap());
        }
        packets.extend(parser.flush().unwrap());
        packets
    }

    #[test]
    fn test_整体送入切分为4个包() {
        let data = build_typical_annex_b();
        let packets = parse_in_chunks(&data, data.len());

        assert_eq!(packets.len(), 4, "应该有 4 个数据包");
        // SPS/PPS 不是关键帧, IDR 是
        assert!(!packets[0].is_keyframe);
        assert!(!packets[1].is_keyframe);
        assert!(packets[2].is_keyframe);
        assert!(!packets[3].is_keyframe);
    }

    #[test]
    fn test_字节守恒() {
        let data = build_typical_annex_b();
        for chunk_size in [1, 2, 3, 5, 7, 16, 64] {
            let packets = parse_in_chunks(&data, chunk_size);
            let total: usize = packets.iter().map(|p| p.size()).sum();
            assert_eq!(total, data.len(), "chunk_size={} 时字节数不守恒", chunk_size);

            let mut joined = Vec::new();
            for p in &packets {
                joined.extend_from_slice(&p.data);
            }
            assert_eq!(joined, data, "chunk_size={} 时拼接结果与输入不一致", chunk_size);
        }
    }

    #[test]
    fn test_分块不变性() {
        let data = build_typical_annex_b();
        let whole = parse_in_chunks(&data, data.len());

        for chunk_size in [1, 2, 3, 4, 5, 6, 7, 8, 9, 13] {
            let chunked = parse_in_chunks(&data, chunk_size);
            assert_eq!(chunked.len(), whole.len(), "chunk_size={}", chunk_size);
            for (a, b) in chunked.iter().zip(whole.iter()) {
                assert_eq!(a.data, b.data, "chunk_size={}", chunk_size);
                assert_eq!(a.pos, b.pos, "chunk_size={}", chunk_size);
                assert_eq!(a.is_keyframe, b.is_keyframe, "chunk_size={}", chunk_size);
            }
        }
    }

    #[test]
    fn test_跨块起始码() {
        let data = build_typical_annex_b();
        let mut parser = H264Parser::new();
        let mut packets = Vec::new();

        // 在 4 字节起始码中间切开 (第二个包的起始码从偏移 10 开始)
        packets.extend(parser.parse(&data[..11]).unwrap());
        packets.extend(parser.parse(&data[11..]).unwrap());
        packets.extend(parser.flush().unwrap());

        assert_eq!(packets.len(), 4);
        let total: usize = packets.iter().map(|p| p.size()).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_不提前产出未完成的包() {
        let data = build_typical_annex_b();
        let mut parser = H264Parser::new();

        // 只送入第一个 NAL 的一部分: 尚无第二个起始码, 不应产出任何包
        let packets = parser.parse(&data[..8]).unwrap();
        assert!(packets.is_empty());
    }

    #[test]
    fn test_空块是无操作() {
        let data = build_typical_annex_b();
        let mut parser = H264Parser::new();

        assert!(parser.parse(&[]).unwrap().is_empty());
        let mut packets = parser.parse(&data).unwrap();
        packets.extend(parser.flush().unwrap());
        assert_eq!(packets.len(), 4);
    }

    #[test]
    fn test_flush幂等() {
        let data = build_typical_annex_b();
        let mut parser = H264Parser::new();
        parser.parse(&data).unwrap();

        let first = parser.flush().unwrap();
        assert_eq!(first.len(), 1);
        // 第二次 flush 是无操作, 绝不重复产出
        let second = parser.flush().unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_flush后拒绝parse() {
        let mut parser = H264Parser::new();
        parser.flush().unwrap();
        let err = parser.parse(&[0x00]).expect_err("flush 后 parse 应返回错误");
        assert!(matches!(err, LiuError::ParserFlushed));
    }

    #[test]
    fn test_空码流直接flush() {
        let mut parser = H264Parser::new();
        let packets = parser.flush().unwrap();
        assert!(packets.is_empty());
    }

    #[test]
    fn test_前导垃圾字节归入第一个包() {
        let mut data = vec![0xDE, 0xAD, 0xBE];
        data.extend_from_slice(&build_typical_annex_b());

        let packets = parse_in_chunks(&data, 4);
        assert_eq!(packets.len(), 4);
        // 前 3 个垃圾字节附着在第一个包上
        assert_eq!(&packets[0].data[..3], &[0xDE, 0xAD, 0xBE]);
        let total: usize = packets.iter().map(|p| p.size()).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_无起始码的码流在flush时报错() {
        let mut parser = H264Parser::new();
        parser.parse(&[0x12, 0x34, 0x56, 0x78]).unwrap();
        let err = parser.flush().expect_err("无起始码应返回 InvalidData");
        assert!(matches!(err, LiuError::InvalidData(_)));
    }

    #[test]
    fn test_包偏移量单调递增() {
        let data = build_typical_annex_b();
        let packets = parse_in_chunks(&data, 5);

        let mut expected = 0i64;
        for p in &packets {
            assert_eq!(p.pos, expected);
            expected += p.size() as i64;
        }
    }
}
