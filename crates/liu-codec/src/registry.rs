//! 编解码器注册表.
//!
//! 支持按 CodecId 动态查找和实例化解析器/解码器. 解析器由本框架内置,
//! 解码器是外部能力, 由调用方注册后才可创建.

use std::collections::HashMap;

use liu_core::LiuResult;

use crate::codec_id::CodecId;
use crate::decoder::Decoder;
use crate::parser::Parser;

/// 解析器工厂函数类型
pub type ParserFactory = fn() -> LiuResult<Box<dyn Parser>>;

/// 解码器工厂函数类型
pub type DecoderFactory = fn() -> LiuResult<Box<dyn Decoder>>;

/// 编解码器注册表
///
/// 管理所有已注册的解析器与解码器, 支持按 CodecId 查找并创建实例.
pub struct CodecRegistry {
    /// 解析器工厂映射
    parsers: HashMap<CodecId, Vec<ParserEntry>>,
    /// 解码器工厂映射
    decoders: HashMap<CodecId, Vec<DecoderEntry>>,
}

/// 解析器注册条目
struct ParserEntry {
    /// 解析器名称
    name: String,
    /// 工厂函数
    factory: ParserFactory,
}

/// 解码器注册条目
struct DecoderEntry {
    /// 解码器名称
    name: String,
    /// 工厂函数
    factory: DecoderFactory,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            decoders: HashMap::new(),
        }
    }

    /// 注册一个解析器
    pub fn register_parser(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: ParserFactory,
    ) {
        self.parsers.entry(codec_id).or_default().push(ParserEntry {
            name: name.into(),
            factory,
        });
    }

    /// 注册一个解码器
    pub fn register_decoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: DecoderFactory,
    ) {
        self.decoders
            .entry(codec_id)
            .or_default()
            .push(DecoderEntry {
                name: name.into(),
                factory,
            });
    }

    /// 创建指定编解码器 ID 的解析器实例
    pub fn create_parser(&self, codec_id: CodecId) -> LiuResult<Box<dyn Parser>> {
        let entries = self.parsers.get(&codec_id).ok_or_else(|| {
            liu_core::LiuError::CodecNotFound(format!("未找到 {} 的解析器", codec_id))
        })?;
        // 使用第一个注册的解析器 (优先级最高)
        let entry = &entries[0];
        (entry.factory)()
    }

    /// 创建指定编解码器 ID 的解码器实例
    pub fn create_decoder(&self, codec_id: CodecId) -> LiuResult<Box<dyn Decoder>> {
        let entries = self.decoders.get(&codec_id).ok_or_else(|| {
            liu_core::LiuError::CodecNotFound(format!("未找到 {} 的解码器", codec_id))
        })?;
        let entry = &entries[0];
        (entry.factory)()
    }

    /// 获取所有已注册的解析器名称
    pub fn list_parsers(&self) -> Vec<(CodecId, &str)> {
        let mut result = Vec::new();
        for (id, entries) in &self.parsers {
            for entry in entries {
                result.push((*id, entry.name.as_str()));
            }
        }
        result
    }

    /// 获取所有已注册的解码器名称
    pub fn list_decoders(&self) -> Vec<(CodecId, &str)> {
        let mut result = Vec::new();
        for (id, entries) in &self.decoders {
            for entry in entries {
                result.push((*id, entry.name.as_str()));
            }
        }
        result
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
