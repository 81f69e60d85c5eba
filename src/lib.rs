//! # Liu (流)
//!
//! 纯 Rust 实现的流式裸码流解析与解码调度框架.
//!
//! Liu 关注一件事: 把任意切分的原始字节流还原为完整的访问单元,
//! 并把它们按序送往下游 (解码器或裸流输出). 具体的解码与容器
//! 解析能力由外部协作者通过 trait 边界注入.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use liu::codec::CodecId;
//! use liu::format::IoContext;
//! use liu::pipeline::{ParseSession, SessionEvent};
//!
//! # fn main() -> liu::core::LiuResult<()> {
//! let registry = liu::default_codec_registry();
//! let parser = registry.create_parser(CodecId::H264)?;
//!
//! let mut io = IoContext::open_read("input.h264")?;
//! let mut session = ParseSession::new(parser);
//! let stats = session.run(&mut io, |event| {
//!     if let SessionEvent::Packet(p) = event {
//!         println!("packet: {} 字节", p.size());
//!     }
//! })?;
//! println!("共 {} 个数据包", stats.packets);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 核心类型与工具 |
//! | `liu-codec` | 解析器/解码器框架 |
//! | `liu-format` | I/O 抽象与裸流读写 |

/// 核心类型与工具
pub use liu_core as core;

/// 解析器与解码器框架
pub use liu_codec as codec;

/// I/O 抽象与裸流读写
pub use liu_format as format;

pub mod logging;
pub mod pipeline;

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置解析器的注册表
pub fn default_codec_registry() -> liu_codec::CodecRegistry {
    let mut registry = liu_codec::CodecRegistry::new();
    liu_codec::register_all(&mut registry);
    registry
}
