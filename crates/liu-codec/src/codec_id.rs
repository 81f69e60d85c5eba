//! 编解码器标识符.
//!
//! 为每种编解码算法分配唯一标识, 与容器格式无关.

use std::fmt;
use liu_core::MediaType;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 视频编解码器
    // ========================
    /// H.264 / AVC / MPEG-4 Part 10
    H264,
    /// H.265 / HEVC / MPEG-H Part 2
    H265,
    /// MPEG-4 Part 2 (ASP)
    Mpeg4,
    /// VP9
    Vp9,
    /// AV1 (Alliance for Open Media)
    Av1,
    /// Raw 视频 (未压缩)
    RawVideo,

    // ========================
    // 音频编解码器
    // ========================
    /// AAC (Advanced Audio Coding)
    Aac,
    /// MP3 (MPEG Audio Layer III)
    Mp3,
    /// Opus
    Opus,
    /// FLAC (Free Lossless Audio Codec)
    Flac,
    /// PCM 有符号 16 位小端
    PcmS16le,
}

impl CodecId {
    /// 获取编解码器对应的媒体类型
    pub const fn media_type(&self) -> MediaType {
        match self {
            Self::None => MediaType::Data,

            // 视频
            Self::H264 | Self::H265 | Self::Mpeg4 | Self::Vp9 | Self::Av1 | Self::RawVideo => {
                MediaType::Video
            }

            // 音频
            Self::Aac | Self::Mp3 | Self::Opus | Self::Flac | Self::PcmS16le => MediaType::Audio,
        }
    }

    /// 获取编解码器的人类可读名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Mpeg4 => "mpeg4",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::RawVideo => "rawvideo",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::PcmS16le => "pcm_s16le",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
