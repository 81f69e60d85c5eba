//! 裸流输出.
//!
//! 把数据包的载荷字节原样写入输出, 不加任何容器结构.
//! 用于把容器中抽取的视频流保存为裸码流文件 (如 Annex B H.264).

use log::debug;

use liu_codec::Packet;
use liu_core::LiuResult;

use crate::io::IoContext;

/// 裸 Elementary Stream 输出器
///
/// 逐包写入载荷字节, 并统计写入量. 输出的字节序列就是
/// 各数据包载荷的顺序拼接.
pub struct RawEsSink {
    /// 输出目标
    io: IoContext,
    /// 已写入的数据包数
    packet_count: u64,
    /// 已写入的字节数
    byte_count: u64,
}

impl RawEsSink {
    /// 创建输出器
    pub fn new(io: IoContext) -> Self {
        Self {
            io,
            packet_count: 0,
            byte_count: 0,
        }
    }

    /// 写入一个数据包的载荷
    ///
    /// 空数据包 (flush 信号) 不产生任何输出.
    pub fn write_packet(&mut self, packet: &Packet) -> LiuResult<()> {
        if packet.is_empty() {
            return Ok(());
        }
        self.io.write_all(&packet.data)?;
        self.packet_count += 1;
        self.byte_count += packet.size() as u64;
        Ok(())
    }

    /// 已写入的数据包数
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    /// 已写入的字节数
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// 结束写入, 返回输出目标
    pub fn finish(self) -> LiuResult<IoContext> {
        debug!(
            "裸流输出完成: {} 包, {} 字节",
            self.packet_count, self.byte_count
        );
        Ok(self.io)
    }
}
