//! 流拷贝流水线集成测试
//!
//! 容器解析是外部能力, 这里用一个内存模拟解封装器验证拷贝调度:
//! 按流索引筛选数据包, 经码流滤镜透传后写出裸码流.

use bytes::Bytes;

use liu::pipeline::copy_stream;
use liu_codec::{CodecId, NullFilter, Packet};
use liu_core::{LiuError, LiuResult, MediaType, PixelFormat, Rational};
use liu_format::Demuxer;
use liu_format::io::IoContext;
use liu_format::sink::RawEsSink;
use liu_format::stream::{Stream, StreamParams, VideoStreamParams};

/// 内存模拟解封装器: 预置两条流与交错的数据包序列
struct MockDemuxer {
    streams: Vec<Stream>,
    packets: Vec<Packet>,
    next: usize,
}

impl MockDemuxer {
    fn new() -> Self {
        let video = Stream {
            index: 0,
            media_type: MediaType::Video,
            codec_id: CodecId::H264,
            time_base: Rational::new(1, 90000),
            extra_data: Vec::new(),
            params: StreamParams::Video(VideoStreamParams {
                width: 320,
                height: 240,
                pixel_format: PixelFormat::Yuv420p,
                frame_rate: Rational::new(25, 1),
            }),
        };
        let audio = Stream {
            index: 1,
            media_type: MediaType::Audio,
            codec_id: CodecId::Aac,
            time_base: Rational::new(1, 48000),
            extra_data: Vec::new(),
            params: StreamParams::Other,
        };

        let mut packets = Vec::new();
        for (i, (stream_index, payload)) in [
            (0usize, vec![0x00, 0x00, 0x00, 0x01, 0x65, 0xAA]),
            (1, vec![0xFF, 0xF1, 0x50]),
            (0, vec![0x00, 0x00, 0x00, 0x01, 0x41, 0xBB, 0xCC]),
            (1, vec![0xFF, 0xF1, 0x51]),
            (0, vec![0x00, 0x00, 0x00, 0x01, 0x41, 0xDD]),
        ]
        .into_iter()
        .enumerate()
        {
            let mut packet = Packet::from_data(Bytes::from(payload));
            packet.stream_index = stream_index;
            packet.pts = i as i64;
            packets.push(packet);
        }

        Self {
            streams: vec![video, audio],
            packets,
            next: 0,
        }
    }

    /// 目标流载荷的顺序拼接 (预期输出)
    fn expected_video_bytes(&self) -> Vec<u8> {
        self.packets
            .iter()
            .filter(|p| p.stream_index == 0)
            .flat_map(|p| p.data.to_vec())
            .collect()
    }
}

impl Demuxer for MockDemuxer {
    fn name(&self) -> &str {
        "mock"
    }

    fn open(&mut self, _io: &mut IoContext) -> LiuResult<()> {
        Ok(())
    }

    fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn read_packet(&mut self, _io: &mut IoContext) -> LiuResult<Packet> {
        match self.packets.get(self.next) {
            Some(packet) => {
                self.next += 1;
                Ok(packet.clone())
            }
            None => Err(LiuError::Eof),
        }
    }
}

fn memory_io() -> IoContext {
    IoContext::new(Box::new(liu_format::io::MemoryBackend::new()))
}

#[test]
fn test_copy_video_stream_to_raw_es() {
    let mut demuxer = MockDemuxer::new();
    let expected = demuxer.expected_video_bytes();

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.h264");

    let mut io = memory_io();
    let mut filter = NullFilter;
    let mut sink = RawEsSink::new(IoContext::open_write(&out_path.to_string_lossy()).unwrap());

    let stats = copy_stream(&mut demuxer, &mut io, 0, &mut filter, &mut sink).unwrap();
    assert_eq!(stats.packets_in, 3, "只应拷贝视频流的 3 个包");
    assert_eq!(stats.packets_out, 3, "透传滤镜不改变包数");
    assert_eq!(stats.bytes_out, expected.len() as u64);

    sink.finish().unwrap();
    let written = std::fs::read(&out_path).unwrap();
    assert_eq!(written, expected, "输出应是视频流载荷的顺序拼接");
}

#[test]
fn test_copy_unknown_stream_index_fails() {
    let mut demuxer = MockDemuxer::new();
    let mut io = memory_io();
    let mut filter = NullFilter;
    let mut sink = RawEsSink::new(memory_io());

    let err = copy_stream(&mut demuxer, &mut io, 7, &mut filter, &mut sink).unwrap_err();
    assert!(matches!(err, LiuError::StreamNotFound(7)));
}
