//! # liu-core
//!
//! Liu 流式解析框架核心库, 提供基础类型定义、错误处理和工具函数.
//!
//! 本 crate 为整个 Liu 框架提供底层基础设施, 不包含任何码流逻辑.

pub mod error;
pub mod media_type;
pub mod pixel_format;
pub mod rational;
pub mod sample_format;
pub mod timestamp;

// 重导出常用类型
pub use error::{LiuError, LiuResult};
pub use media_type::MediaType;
pub use pixel_format::PixelFormat;
pub use rational::Rational;
pub use sample_format::SampleFormat;
