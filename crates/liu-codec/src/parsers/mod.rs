//! 内置裸码流解析器.
//!
//! 每个解析器实现 [`crate::parser::Parser`] trait, 将原始字节流增量
//! 切分为数据包.

pub mod h264;
pub mod m4v;

use crate::codec_id::CodecId;
use crate::registry::CodecRegistry;

/// 注册所有内置解析器
pub fn register_all_parsers(registry: &mut CodecRegistry) {
    registry.register_parser(CodecId::H264, "h264", h264::H264Parser::create);
    registry.register_parser(CodecId::Mpeg4, "m4v", m4v::M4vParser::create);
}
