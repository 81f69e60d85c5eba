//! MPEG-4 Part 2 Elementary Stream (M4V) 增量解析器.
//!
//! M4V 是 MPEG-4 Part 2 视频的裸流格式, 不含容器结构.
//! 文件由一系列以 `00 00 01 xx` 起始码分隔的语法单元组成:
//!
//! ```text
//! [Visual Object Sequence Header (0x000001B0)]
//! [Visual Object (0x000001B5)]
//! [Video Object Layer (0x000001B2)]
//! [VOP Header (0x000001B6)] + compressed data
//! [VOP Header (0x000001B6)] + compressed data
//! ...
//! ```
//!
//! 数据包边界取在 VOP 起始码上: 一个数据包对应一个访问单元,
//! 其前方的序列级头部 (VOL/VO 等) 附着在随后的 VOP 数据包上.
//! 最后一个 VOP 停留在缓冲区中, 直到 `flush()`.

use bytes::{Bytes, BytesMut};
use log::debug;

use liu_core::{LiuError, LiuResult, Rational};

use crate::codec_id::CodecId;
use crate::packet::Packet;
use crate::parser::Parser;

/// MPEG-4 start code 前缀
const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

/// VOP (Video Object Plane) start code
const VOP_START: u8 = 0xB6;

/// M4V 增量解析器
pub struct M4vParser {
    /// 尚未切分的缓冲数据
    buf: BytesMut,
    /// 缓冲区内已确认的 VOP 边界, 严格递增
    boundaries: Vec<usize>,
    /// 扫描恢复位置
    scan_pos: usize,
    /// 整条码流中已见到的 VOP 总数
    vop_count: u64,
    /// 已产出数据包占用的码流字节偏移
    base_offset: u64,
    /// 已产出的帧序号 (作为 pts)
    frame_count: u64,
    /// 时间基 (默认 25fps; 精确值需解析 VOL, 超出本解析器职责)
    timebase: Rational,
    /// 是否已 flush (终态)
    flushed: bool,
}

impl M4vParser {
    /// 创建解析器
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            boundaries: Vec::new(),
            scan_pos: 0,
            vop_count: 0,
            base_offset: 0,
            frame_count: 0,
            timebase: Rational::new(1, 25),
            flushed: false,
        }
    }

    /// 创建解析器实例 (工厂函数)
    pub fn create() -> LiuResult<Box<dyn Parser>> {
        Ok(Box::new(Self::new()))
    }

    /// 扫描缓冲区中新到达的 VOP 起始码
    fn scan_vop_starts(&mut self) {
        let data = &self.buf[..];
        let mut i = self.scan_pos;

        while i + 4 <= data.len() {
            if data[i..i + 3] == START_CODE_PREFIX && data[i + 3] == VOP_START {
                if self.boundaries.last().is_none_or(|&last| i > last) {
                    self.boundaries.push(i);
                    self.vop_count += 1;
                }
                i += 4;
            } else {
                i += 1;
            }
        }

        // 起始码可能跨块: 末尾 3 字节留到下一轮重扫
        self.scan_pos = data.len().saturating_sub(3);
    }

    /// 产出所有已完整的访问单元
    fn drain_complete_packets(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();
        while self.boundaries.len() >= 2 {
            let cut = self.boundaries[1];
            let head = self.buf.split_to(cut).freeze();

            self.boundaries.remove(0);
            for b in &mut self.boundaries {
                *b -= cut;
            }
            self.scan_pos -= cut;

            packets.push(self.make_packet(head));
            self.base_offset += cut as u64;
        }
        packets
    }

    /// 用切下的字节构造数据包
    fn make_packet(&mut self, data: Bytes) -> Packet {
        let pts = self.frame_count as i64;
        self.frame_count += 1;

        Packet {
            pts,
            dts: pts,
            duration: 1,
            time_base: self.timebase,
            // 简化处理: 不解析 VOP 编码类型, 统一标记为关键帧
            is_keyframe: true,
            pos: self.base_offset as i64,
            ..Packet::from_data(data)
        }
    }
}

impl Default for M4vParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for M4vParser {
    fn codec_id(&self) -> CodecId {
        CodecId::Mpeg4
    }

    fn name(&self) -> &str {
        "m4v"
    }

    fn parse(&mut self, chunk: &[u8]) -> LiuResult<Vec<Packet>> {
        if self.flushed {
            return Err(LiuError::ParserFlushed);
        }
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        self.buf.extend_from_slice(chunk);
        self.scan_vop_starts();
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
        if self.vop_count == 0 {
            return Err(LiuError::InvalidData(
                "M4V: 码流中未找到 VOP 起始码".into(),
            ));
        }

        let cut = self.buf.len();
        let head = self.buf.split_to(cut).freeze();
        self.boundaries.clear();
        self.scan_pos = 0;

        let packet = self.make_packet(head);
        self.base_offset += cut as u64;
        debug!("M4V: flush 产出尾部数据包, size={}", cut);
        Ok(vec![packet])
    }
}
