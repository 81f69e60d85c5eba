//! 解码后的帧数据 (Frame).
//!
//! 表示解码后的原始音视频数据, 是本框架流水线的终端产物,
//! 所有权归调用方 (显示/存储/打印由外部协作者负责).

use liu_core::{PixelFormat, Rational, SampleFormat};

/// 视频帧
///
/// 包含解码后的原始像素数据, 支持多平面存储.
/// 例如 YUV420P 格式有 3 个平面: Y, U, V.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 各平面的像素数据
    pub data: Vec<Vec<u8>>,
    /// 各平面每行的字节数 (linesize / stride)
    pub linesize: Vec<usize>,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
    /// 是否为关键帧
    pub is_keyframe: bool,
}

impl VideoFrame {
    /// 创建空的视频帧
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        let plane_count = pixel_format.plane_count() as usize;
        Self {
            data: vec![Vec::new(); plane_count],
            linesize: vec![0; plane_count],
            width,
            height,
            pixel_format,
            pts: liu_core::timestamp::NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
            is_keyframe: false,
        }
    }
}

/// 音频帧
///
/// 包含解码后的原始音频采样数据.
/// 平面格式: data 中每个 Vec 对应一个声道.
/// 交错格式: data 中只有一个 Vec, 所有声道交替排列.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 音频采样数据
    pub data: Vec<Vec<u8>>,
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道数
    pub channels: u32,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
}

impl AudioFrame {
    /// 创建空的音频帧
    pub fn new(nb_samples: u32, sample_rate: u32, sample_format: SampleFormat, channels: u32) -> Self {
        let plane_count = if sample_format.is_planar() {
            channels as usize
        } else {
            1
        };
        Self {
            data: vec![Vec::new(); plane_count],
            nb_samples,
            sample_rate,
            sample_format,
            channels,
            pts: liu_core::timestamp::NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
        }
    }
}

/// 帧 (视频帧或音频帧的统一包装)
#[derive(Debug, Clone)]
pub enum Frame {
    /// 视频帧
    Video(VideoFrame),
    /// 音频帧
    Audio(AudioFrame),
}

impl Frame {
    /// 帧的显示时间戳
    pub fn pts(&self) -> i64 {
        match self {
            Self::Video(v) => v.pts,
            Self::Audio(a) => a.pts,
        }
    }
}
