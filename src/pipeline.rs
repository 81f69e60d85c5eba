//! 流式解析/解码调度.
//!
//! 把 "分块读取 -> 增量解析 -> 送入解码器" 的调度循环收敛到一处:
//! 调用方只负责提供数据块 (或一个 [`IoContext`]), 本模块保证
//! 解析器 flush 与解码器排空在流结束时被正确触发.

use log::{debug, info};

use liu_codec::{BitstreamFilter, Decoder, Frame, Packet, Parser};
use liu_core::{LiuError, LiuResult};
use liu_format::io::IoContext;
use liu_format::sink::RawEsSink;
use liu_format::Demuxer;

/// 默认读取块大小 (64 KB)
pub const DEFAULT_READ_SIZE: usize = 64 * 1024;

/// 解析会话产出的事件
#[derive(Debug)]
pub enum SessionEvent {
    /// 解析器产出一个完整数据包
    Packet(Packet),
    /// 解码器产出一帧
    Frame(Frame),
}

/// 会话统计信息
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    /// 读取的数据块数
    pub chunks: u64,
    /// 输入字节总数
    pub bytes_in: u64,
    /// 产出的数据包数
    pub packets: u64,
    /// 解码产出的帧数
    pub frames: u64,
}

/// 流式解析会话
///
/// 驱动一个增量解析器, 可选地把产出的数据包送入解码器.
/// 必须以 [`finish`](Self::finish) 收尾, 否则缓冲区中的
/// 尾部数据包 (以及解码器内部的延迟帧) 会丢失.
pub struct ParseSession {
    parser: Box<dyn Parser>,
    decoder: Option<Box<dyn Decoder>>,
    read_size: usize,
    finished: bool,
    stats: SessionStats,
}

impl ParseSession {
    /// 创建只解析不解码的会话
    pub fn new(parser: Box<dyn Parser>) -> Self {
        Self {
            parser,
            decoder: None,
            read_size: DEFAULT_READ_SIZE,
            finished: false,
            stats: SessionStats::default(),
        }
    }

    /// 附加解码器
    pub fn with_decoder(mut self, decoder: Box<dyn Decoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// 设置 `run` 使用的读取块大小
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    /// 送入一个数据块
    ///
    /// 返回本次产生的事件序列 (数据包与随之解码出的帧, 按产生顺序).
    /// 空块是无操作; 流结束要用 [`finish`](Self::finish) 显式声明.
    pub fn feed(&mut self, chunk: &[u8]) -> LiuResult<Vec<SessionEvent>> {
        if self.finished {
            return Err(LiuError::ParserFlushed);
        }
        self.stats.chunks += 1;
        self.stats.bytes_in += chunk.len() as u64;

        let packets = self.parser.parse(chunk)?;
        self.emit_packets(packets)
    }

    /// 声明流结束
    ///
    /// 触发解析器 flush 产出尾部数据包, 并排空解码器中的延迟帧.
    /// 幂等: 重复调用返回空事件序列.
    pub fn finish(&mut self) -> LiuResult<Vec<SessionEvent>> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.finished = true;

        let packets = self.parser.flush()?;
        let mut events = self.emit_packets(packets)?;

        // 解码器排空: 送入空包宣告流结束, 读帧直到 Eof
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.send_packet(&Packet::empty())?;
            loop {
                match decoder.receive_frame() {
                    Ok(frame) => {
                        self.stats.frames += 1;
                        events.push(SessionEvent::Frame(frame));
                    }
                    Err(LiuError::Eof) | Err(LiuError::NeedMoreData) => break,
                    Err(e) => return Err(e),
                }
            }
        }

        debug!(
            "会话结束: {} 块 / {} 字节 -> {} 包 / {} 帧",
            self.stats.chunks, self.stats.bytes_in, self.stats.packets, self.stats.frames
        );
        Ok(events)
    }

    /// 从 I/O 上下文驱动完整的解析循环
    ///
    /// 持续读取数据块直到输入耗尽 (空块), 随后自动 `finish`.
    /// 每个事件经由 `handler` 回调交给调用方.
    pub fn run(
        &mut self,
        io: &mut IoContext,
        mut handler: impl FnMut(&SessionEvent),
    ) -> LiuResult<SessionStats> {
        loop {
            let chunk = io.read_chunk(self.read_size)?;
            if chunk.is_empty() {
                break;
            }
            for event in self.feed(&chunk)? {
                handler(&event);
            }
        }
        for event in self.finish()? {
            handler(&event);
        }
        Ok(self.stats)
    }

    /// 当前统计信息
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// 把数据包转换为事件, 途中送入解码器
    fn emit_packets(&mut self, packets: Vec<Packet>) -> LiuResult<Vec<SessionEvent>> {
        let mut events = Vec::with_capacity(packets.len());
        for packet in packets {
            self.stats.packets += 1;
            if let Some(decoder) = self.decoder.as_mut() {
                decoder.send_packet(&packet)?;
                events.push(SessionEvent::Packet(packet));
                loop {
                    match decoder.receive_frame() {
                        Ok(frame) => {
                            self.stats.frames += 1;
                            events.push(SessionEvent::Frame(frame));
                        }
                        Err(LiuError::NeedMoreData) => break,
                        Err(LiuError::Eof) => break,
                        Err(e) => return Err(e),
                    }
                }
            } else {
                events.push(SessionEvent::Packet(packet));
            }
        }
        Ok(events)
    }
}

/// 拷贝统计信息
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyStats {
    /// 从容器读出的数据包数 (目标流)
    pub packets_in: u64,
    /// 写入输出的数据包数 (过滤后)
    pub packets_out: u64,
    /// 写入输出的字节数
    pub bytes_out: u64,
}

/// 从容器中拷贝一条流到裸码流输出
///
/// 逐包读取 `demuxer`, 只保留 `stream_index` 指定的流,
/// 每个数据包经 `filter` 变换后写入 `sink`. 不做转码.
pub fn copy_stream(
    demuxer: &mut dyn Demuxer,
    io: &mut IoContext,
    stream_index: usize,
    filter: &mut dyn BitstreamFilter,
    sink: &mut RawEsSink,
) -> LiuResult<CopyStats> {
    if stream_index >= demuxer.streams().len() {
        return Err(LiuError::StreamNotFound(stream_index));
    }

    let mut stats = CopyStats::default();
    loop {
        let packet = match demuxer.read_packet(io) {
            Ok(packet) => packet,
            Err(LiuError::Eof) => break,
            Err(e) => return Err(e),
        };
        if packet.stream_index != stream_index {
            continue;
        }
        stats.packets_in += 1;

        for out in filter.filter(&packet)? {
            stats.bytes_out += out.size() as u64;
            stats.packets_out += 1;
            sink.write_packet(&out)?;
        }
    }

    info!(
        "流拷贝完成: stream={} 读入 {} 包, 写出 {} 包 / {} 字节",
        stream_index, stats.packets_in, stats.packets_out, stats.bytes_out
    );
    Ok(stats)
}
