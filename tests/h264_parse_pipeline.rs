//! H.264 裸码流解析流水线集成测试
//!
//! 覆盖增量解析的核心性质: 分块方式不影响产出, 字节精确守恒,
//! 流结束必须显式声明.

use liu::pipeline::{ParseSession, SessionEvent};
use liu_codec::{CodecId, Packet};
use liu_core::LiuError;
use liu_format::io::{IoContext, MemoryBackend};

/// 构造典型的 H.264 Annex B 码流 (SPS + PPS + IDR + P)
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

/// 用指定的分块序列驱动解析会话, 收集全部数据包
///
/// `splits` 是每次 feed 的字节数; 剩余数据在最后一次 feed 送入.
fn parse_with_splits(data: &[u8], splits: &[usize]) -> Vec<Packet> {
    let registry = liu::default_codec_registry();
    let parser = registry.create_parser(CodecId::H264).unwrap();
    let mut session = ParseSession::new(parser);

    let mut packets = Vec::new();
    let mut collect = |events: Vec<SessionEvent>| {
        for event in events {
            if let SessionEvent::Packet(p) = event {
                packets.push(p);
            }
        }
    };

    let mut offset = 0;
    for &len in splits {
        let end = (offset + len).min(data.len());
        collect(session.feed(&data[offset..end]).unwrap());
        offset = end;
    }
    collect(session.feed(&data[offset..]).unwrap());
    collect(session.finish().unwrap());
    packets
}

#[test]
fn test_full_stream_produces_four_packets() {
    let data = build_typical_annex_b();
    let packets = parse_with_splits(&data, &[]);

    assert_eq!(packets.len(), 4);
    // SPS 包保留完整的 4 字节起始码
    assert_eq!(&packets[0].data[..5], &[0x00, 0x00, 0x00, 0x01, 0x67]);
    // IDR 包标记为关键帧
    assert!(packets[2].is_keyframe);
    assert!(!packets[3].is_keyframe);
}

#[test]
fn test_byte_conservation() {
    let data = build_typical_annex_b();
    let packets = parse_with_splits(&data, &[]);

    let mut reassembled = Vec::new();
    for p in &packets {
        reassembled.extend_from_slice(&p.data);
    }
    assert_eq!(reassembled, data, "数据包拼接应精确还原输入");
}

#[test]
fn test_chunking_invariance() {
    let data = build_typical_annex_b();
    let whole = parse_with_splits(&data, &[]);

    // 不同的分块方式, 包括空块与跨起始码切分
    let split_plans: &[&[usize]] = &[
        &[1],
        &[4, 6],
        &[10],
        &[0, 10],
        &[2, 2, 2, 2, 2, 2],
        &[data.len() - 1],
    ];

    for splits in split_plans {
        let chunked = parse_with_splits(&data, splits);
        assert_eq!(chunked.len(), whole.len(), "splits={splits:?}");
        for (a, b) in chunked.iter().zip(whole.iter()) {
            assert_eq!(a.data, b.data, "splits={splits:?}");
            assert_eq!(a.is_keyframe, b.is_keyframe, "splits={splits:?}");
        }
    }
}

#[test]
fn test_single_byte_chunks() {
    let data = build_typical_annex_b();
    let whole = parse_with_splits(&data, &[]);

    let registry = liu::default_codec_registry();
    let parser = registry.create_parser(CodecId::H264).unwrap();
    let mut session = ParseSession::new(parser);

    let mut packets = Vec::new();
    for byte in &data {
        for event in session.feed(std::slice::from_ref(byte)).unwrap() {
            if let SessionEvent::Packet(p) = event {
                packets.push(p);
            }
        }
    }
    for event in session.finish().unwrap() {
        if let SessionEvent::Packet(p) = event {
            packets.push(p);
        }
    }

    assert_eq!(packets.len(), whole.len());
    for (a, b) in packets.iter().zip(whole.iter()) {
        assert_eq!(a.data, b.data);
    }
}

#[test]
fn test_feed_after_finish_is_rejected() {
    let registry = liu::default_codec_registry();
    let parser = registry.create_parser(CodecId::H264).unwrap();
    let mut session = ParseSession::new(parser);

    session.feed(&build_typical_annex_b()).unwrap();
    session.finish().unwrap();

    assert!(matches!(
        session.feed(&[0x00, 0x00, 0x01]).unwrap_err(),
        LiuError::ParserFlushed
    ));
}

#[test]
fn test_leading_garbage_attaches_to_first_packet() {
    let mut data = vec![0xDE, 0xAD, 0xBE, 0xEF];
    data.extend_from_slice(&build_typical_annex_b());
    let packets = parse_with_splits(&data, &[2, 3]);

    assert_eq!(packets.len(), 4);
    assert_eq!(&packets[0].data[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);

    let total: usize = packets.iter().map(|p| p.size()).sum();
    assert_eq!(total, data.len());
}

#[test]
fn test_stream_without_start_codes_fails_at_flush() {
    let registry = liu::default_codec_registry();
    let parser = registry.create_parser(CodecId::H264).unwrap();
    let mut session = ParseSession::new(parser);

    session.feed(&[0x12, 0x34, 0x56, 0x78]).unwrap();
    let err = session.finish().expect_err("无起始码的码流应报错");
    assert!(matches!(err, LiuError::InvalidData(_)));
}

#[test]
fn test_run_over_io_context_matches_direct_feed() {
    let data = build_typical_annex_b();
    let whole = parse_with_splits(&data, &[]);

    for read_size in [1, 3, 7, 64 * 1024] {
        let registry = liu::default_codec_registry();
        let parser = registry.create_parser(CodecId::H264).unwrap();
        let mut session = ParseSession::new(parser).with_read_size(read_size);

        let mut io = IoContext::new(Box::new(MemoryBackend::from_data(data.clone())));
        let mut packets = Vec::new();
        let stats = session
            .run(&mut io, |event| {
                if let SessionEvent::Packet(p) = event {
                    packets.push(p.data.clone());
                }
            })
            .unwrap();

        assert_eq!(stats.packets as usize, whole.len(), "read_size={read_size}");
        assert_eq!(stats.bytes_in, data.len() as u64);
        for (a, b) in packets.iter().zip(whole.iter()) {
            assert_eq!(a, &b.data, "read_size={read_size}");
        }
    }
}
