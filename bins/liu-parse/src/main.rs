//! liu-parse - 裸码流解析命令行工具
//!
//! 分块读取 H.264 / M4V 裸码流, 增量切分出访问单元并打印统计信息.
//! 输入可以是本地文件或 HTTP URL (下载后缓存); 容器文件会先经外部
//! ffmpeg 抽取为裸码流.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use liu::pipeline::{ParseSession, SessionEvent};
use liu_codec::CodecId;
use liu_core::LiuError;
use liu_format::io::IoContext;
use liu_format::sink::RawEsSink;

/// Liu 裸码流解析工具
#[derive(Parser, Debug)]
#[command(name = "liu-parse", version, about = "纯 Rust 裸码流解析工具")]
struct Cli {
    /// 输入路径或 URL (裸码流, 或待抽取的容器文件)
    input: Option<String>,

    /// 码流编码格式
    #[arg(long, default_value = "h264")]
    codec: String,

    /// 读取块大小 (字节)
    #[arg(long, default_value_t = 64 * 1024)]
    read_size: usize,

    /// 尝试解码数据包 (需要已注册的解码器)
    #[arg(long)]
    decode: bool,

    /// 显示每个数据包的详细信息
    #[arg(long)]
    show_packets: bool,

    /// 把数据包载荷原样写入裸码流文件
    #[arg(long)]
    dump: Option<String>,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (只输出解析结果)
    #[arg(short, long)]
    quiet: bool,
}

/// 解析结果汇总
#[derive(Serialize)]
struct ParseOutput {
    input: String,
    codec: String,
    read_size: usize,
    chunks: u64,
    bytes_in: u64,
    packets: u64,
    keyframes: u64,
    frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dumped_bytes: Option<u64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let Some(input) = cli.input.as_ref() else {
        print_banner();
        return;
    };

    if !cli.quiet {
        eprintln!(
            "liu-parse 版本 {} -- 纯 Rust 裸码流解析工具",
            env!("CARGO_PKG_VERSION")
        );
        eprintln!("输入: {input}");
    }

    let codec_id = match parse_codec_name(&cli.codec) {
        Some(id) => id,
        None => {
            eprintln!("错误: 不支持的编码格式 '{}' (可用: h264, m4v)", cli.codec);
            process::exit(1);
        }
    };

    let input_path = match resolve_input(input, codec_id) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("错误: 无法准备输入 '{input}': {e}");
            process::exit(1);
        }
    };

    let registry = liu::default_codec_registry();
    let parser = match registry.create_parser(codec_id) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("错误: 无法创建解析器: {e}");
            process::exit(1);
        }
    };

    let mut session = ParseSession::new(parser).with_read_size(cli.read_size.max(1));

    // 解码是可选能力: 没有注册解码器时退回纯解析
    if cli.decode {
        match registry.create_decoder(codec_id) {
            Ok(decoder) => session = session.with_decoder(decoder),
            Err(LiuError::CodecNotFound(_)) => {
                eprintln!("警告: 未注册 {codec_id} 解码器, 退回纯解析模式");
            }
            Err(e) => {
                eprintln!("错误: 无法创建解码器: {e}");
                process::exit(1);
            }
        }
    }

    let mut io = match IoContext::open_read(&input_path.to_string_lossy()) {
        Ok(io) => io,
        Err(e) => {
            eprintln!("错误: 无法打开文件 '{}': {e}", input_path.display());
            process::exit(1);
        }
    };

    let mut sink = match cli.dump.as_ref() {
        Some(path) => match IoContext::open_write(path) {
            Ok(out) => Some(RawEsSink::new(out)),
            Err(e) => {
                eprintln!("错误: 无法创建输出文件 '{path}': {e}");
                process::exit(1);
            }
        },
        None => None,
    };

    let mut keyframes = 0u64;
    let mut dump_error = None;
    let stats = session.run(&mut io, |event| match event {
        SessionEvent::Packet(packet) => {
            if packet.is_keyframe {
                keyframes += 1;
            }
            if cli.show_packets {
                println!(
                    "packet size={} pts={} keyframe={} pos={}",
                    packet.size(),
                    packet.pts,
                    packet.is_keyframe,
                    packet.pos
                );
            }
            if let Some(sink) = sink.as_mut() {
                if dump_error.is_none() {
                    if let Err(e) = sink.write_packet(packet) {
                        dump_error = Some(e);
                    }
                }
            }
        }
        SessionEvent::Frame(frame) => {
            if cli.show_packets {
                println!("frame pts={}", frame.pts());
            }
        }
    });

    let stats = match stats {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("错误: 解析失败: {e}");
            process::exit(1);
        }
    };
    if let Some(e) = dump_error {
        eprintln!("错误: 写入裸码流失败: {e}");
        process::exit(1);
    }

    let dumped_bytes = match sink {
        Some(sink) => {
            let bytes = sink.byte_count();
            if let Err(e) = sink.finish() {
                eprintln!("错误: 关闭输出失败: {e}");
                process::exit(1);
            }
            Some(bytes)
        }
        None => None,
    };

    let output = ParseOutput {
        input: input.clone(),
        codec: cli.codec.clone(),
        read_size: cli.read_size,
        chunks: stats.chunks,
        bytes_in: stats.bytes_in,
        packets: stats.packets,
        keyframes,
        frames: stats.frames,
        dumped_bytes,
    };

    if cli.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("错误: JSON 序列化失败: {e}");
                process::exit(1);
            }
        }
    } else {
        print_summary_text(&output);
    }
}

/// 把编码格式名称映射为 CodecId
fn parse_codec_name(name: &str) -> Option<CodecId> {
    match name {
        "h264" | "avc" => Some(CodecId::H264),
        "m4v" | "mpeg4" => Some(CodecId::Mpeg4),
        _ => None,
    }
}

/// 把输入参数解析为本地裸码流文件路径
///
/// HTTP URL 先下载缓存; 容器扩展名 (mp4/mkv/mov) 再经 ffmpeg
/// 抽取出目标编码格式的裸码流.
fn resolve_input(input: &str, codec_id: CodecId) -> liu_core::LiuResult<PathBuf> {
    let local = if input.starts_with("http://") || input.starts_with("https://") {
        liu_format::datasets::cached(input)?
    } else {
        PathBuf::from(input)
    };

    let is_container = local
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "mp4" | "mkv" | "mov" | "avi"));
    if !is_container {
        return Ok(local);
    }

    let raw_ext = match codec_id {
        CodecId::Mpeg4 => "m4v",
        _ => "h264",
    };
    let raw_path = local.with_extension(raw_ext);
    liu_format::datasets::extract_raw_stream(&local, &raw_path)?;
    Ok(raw_path)
}

/// 文本格式输出汇总
fn print_summary_text(output: &ParseOutput) {
    println!("[PARSE]");
    println!("  输入         : {}", output.input);
    println!("  编码格式     : {}", output.codec);
    println!("  读取块大小   : {} 字节", output.read_size);
    println!("  数据块数     : {}", output.chunks);
    println!(
        "  输入总量     : {} 字节 ({:.2} KB)",
        output.bytes_in,
        output.bytes_in as f64 / 1024.0
    );
    println!("  数据包总数   : {}", output.packets);
    println!("  关键帧包数   : {}", output.keyframes);
    if output.frames > 0 {
        println!("  解码帧数     : {}", output.frames);
    }
    if let Some(dumped) = output.dumped_bytes {
        println!("  写出裸码流   : {dumped} 字节");
    }
    println!("[/PARSE]");
}

/// 打印版本横幅
fn print_banner() {
    println!(
        "liu-parse 版本 {} -- 纯 Rust 裸码流解析工具",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("用法: liu-parse [选项] <输入>");
    println!();
    println!("选项:");
    println!("  --codec <h264|m4v>  码流编码格式 (默认 h264)");
    println!("  --read-size <N>     读取块大小 (默认 65536)");
    println!("  --decode            尝试解码数据包");
    println!("  --show-packets      显示每个数据包");
    println!("  --dump <路径>       写出裸码流文件");
    println!("  --json              以 JSON 格式输出");
    println!("  -q, --quiet         静默模式");
    println!();
    println!("使用 --help 查看完整用法.");
}
