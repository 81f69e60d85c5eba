//! 解码器 trait 定义.
//!
//! 解码是本框架之外的能力: 框架只定义调用约定, 具体实现由外部注入.
//! 解码器状态由单一调用方独占持有, 不考虑并发访问.

use liu_core::LiuResult;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::Frame;
use crate::packet::Packet;

/// 解码器 trait
///
/// 解码流程:
/// 1. 调用 `send_packet()` 送入压缩数据包
/// 2. 调用 `receive_frame()` 取出解码后的帧
/// 3. 重复以上步骤直到所有数据处理完毕
/// 4. 送入空包 (flush) 以获取解码器中缓存的帧
///
/// 一个数据包可能产出零帧 (如参考帧尚未送入) 或多帧;
/// 零帧不是错误, 依赖补齐后帧会在后续数据包产出.
pub trait Decoder: Send {
    /// 获取解码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用参数配置解码器
    ///
    /// 默认实现为空操作, 允许不需要额外配置的解码器跳过此步骤.
    fn open(&mut self, _params: &CodecParameters) -> LiuResult<()> {
        Ok(())
    }

    /// 送入一个压缩数据包进行解码
    ///
    /// # 参数
    /// - `packet`: 压缩数据包. 送入空包表示刷新 (flush), 获取缓存帧.
    ///
    /// # 返回
    /// - `Ok(())`: 数据包已接受
    /// - `Err(LiuError::NeedMoreData)`: 解码器内部缓冲区已满, 需要先取出帧
    fn send_packet(&mut self, packet: &Packet) -> LiuResult<()>;

    /// 从解码器取出一帧解码数据
    ///
    /// # 返回
    /// - `Ok(frame)`: 成功取出一帧
    /// - `Err(LiuError::NeedMoreData)`: 需要送入更多数据包
    /// - `Err(LiuError::Eof)`: 所有帧已取出
    fn receive_frame(&mut self) -> LiuResult<Frame>;

    /// 重置解码器内部状态
    fn reset(&mut self);
}
