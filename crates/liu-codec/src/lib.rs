//! # liu-codec
//!
//! Liu 流式解析框架编解码器库, 提供 Packet/Frame 抽象、解析器与解码器框架.
//!
//! 本 crate 定义了增量解析、解码调度的核心抽象:
//!
//! - **解析器** (`Parser`): 将原始字节流增量切分为完整的数据包,
//!   跨数据块边界累积不完整数据, 通过显式 `flush()` 结束码流.
//! - **解码器** (`Decoder`): 不透明的解码能力, 由外部实现注入.
//! - **码流滤镜** (`BitstreamFilter`): 数据包进、数据包出的透传边界.
//!
//! ## 使用示例
//!
//! ```rust
//! use liu_codec::{CodecId, CodecRegistry};
//!
//! let mut reg = CodecRegistry::new();
//! liu_codec::register_all(&mut reg);
//!
//! // 按 CodecId 创建解析器实例
//! let parser = reg.create_parser(CodecId::H264).unwrap();
//! assert_eq!(parser.name(), "h264");
//! ```

pub mod bitstream;
pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod frame;
pub mod packet;
pub mod parser;
pub mod parsers;
pub mod registry;

// 重导出常用类型
pub use bitstream::{BitstreamFilter, NullFilter};
pub use codec_id::CodecId;
pub use codec_parameters::{AudioCodecParams, CodecParameters, CodecParamsType, VideoCodecParams};
pub use decoder::Decoder;
pub use frame::{AudioFrame, Frame, VideoFrame};
pub use packet::Packet;
pub use parser::Parser;
pub use registry::CodecRegistry;

/// 注册所有内置解析器
pub fn register_all(registry: &mut CodecRegistry) {
    parsers::register_all_parsers(registry);
}
