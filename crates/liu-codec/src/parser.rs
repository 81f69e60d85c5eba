//! 码流解析器 trait 定义.
//!
//! 解析器将原始字节流增量切分为完整的数据包. 输入以任意大小的数据块
//! 到达, 跨块边界的不完整数据由解析器内部缓存, 直到凑齐一个完整包.
//!
//! 与"送入空块表示结束"的隐式约定不同, 本框架将码流结束定义为显式的
//! `flush()` 操作: 漏掉它会丢失缓冲中的尾部数据包, 显式操作让这种
//! 遗漏在类型层面可见.

use liu_core::LiuResult;

use crate::codec_id::CodecId;
use crate::packet::Packet;

/// 增量码流解析器 trait
///
/// 解析流程:
/// 1. 循环调用 `parse()` 送入数据块, 消费返回的完整数据包
/// 2. 输入耗尽后调用一次 `flush()`, 取出缓冲中可终结的尾部数据包
/// 3. 之后解析器进入终态, 继续 `parse()` 将返回错误
///
/// # 不变量
///
/// - 解析器不丢弃任何字节: 所有产出数据包 (含 flush 产出) 的载荷
///   拼接结果与输入字节序列完全一致
/// - 数据包按字节送入顺序产出, 不做任何重排
/// - 数据包切分只取决于字节内容, 与送入的分块方式无关
pub trait Parser: Send {
    /// 获取解析器对应的编解码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取解析器名称
    fn name(&self) -> &str;

    /// 送入一个数据块, 返回零个或多个完整数据包
    ///
    /// 空块是无操作 (返回空列表), 不触发 flush.
    ///
    /// # 返回
    /// - `Ok(packets)`: 由先前缓冲 + 新送入字节组装出的完整数据包
    /// - `Err(LiuError::ParserFlushed)`: 解析器已被 `flush()`
    /// - `Err(LiuError::InvalidData)`: 码流损坏, 本次运行视为致命错误
    fn parse(&mut self, chunk: &[u8]) -> LiuResult<Vec<Packet>>;

    /// 结束码流, 取出缓冲中可终结的尾部数据包
    ///
    /// 首次调用后解析器进入终态; 再次调用是无操作, 返回空列表,
    /// 绝不重复产出已发出的数据包.
    fn flush(&mut self) -> LiuResult<Vec<Packet>>;
}
