//! 解封装器边界.
//!
//! 容器格式 (MP4/MKV 等) 的解析不属于本框架的职责范围,
//! 由外部协作者实现此 trait 后接入拷贝流水线.

use liu_codec::Packet;
use liu_core::LiuResult;

use crate::io::IoContext;
use crate::stream::Stream;

/// 解封装器 trait
///
/// 从容器中逐个读出压缩数据包. 读到 [`liu_core::LiuError::Eof`]
/// 表示容器已耗尽, 之后不应再调用 `read_packet`.
pub trait Demuxer: Send {
    /// 解封装器名称
    fn name(&self) -> &str;

    /// 打开输入并解析容器头部
    ///
    /// 成功后 `streams()` 返回的流信息才有效.
    fn open(&mut self, io: &mut IoContext) -> LiuResult<()>;

    /// 获取容器中的流列表
    fn streams(&self) -> &[Stream];

    /// 读取下一个数据包
    ///
    /// 数据包的 `stream_index` 标记其归属的流. 容器耗尽时返回 `Eof`.
    fn read_packet(&mut self, io: &mut IoContext) -> LiuResult<Packet>;

    /// 获取总时长 (秒, 如果可知)
    fn duration(&self) -> Option<f64> {
        None
    }
}
