//! # liu-format
//!
//! Liu 流式解析框架 I/O 库, 提供统一的数据读写抽象与裸流输出.
//!
//! 容器格式的解析属于外部协作者: 本 crate 只定义 [`Demuxer`] 边界,
//! 不包含任何具体容器实现.

pub mod demuxer;
#[cfg(feature = "http")]
pub mod datasets;
pub mod io;
pub mod sink;
pub mod stream;

// 重导出常用类型
pub use demuxer::Demuxer;
pub use io::IoContext;
pub use sink::RawEsSink;
pub use stream::Stream;
