//! 码流滤镜 (Bitstream Filter) 边界定义.
//!
//! 码流滤镜在不解码的前提下改写数据包的封装形式 (如长度前缀与起始码
//! 之间的转换). 具体改写属于外部能力, 本框架只定义"数据包进、零个或
//! 多个数据包出"的调用约定, 并提供一个透传实现用于组装流水线.

use liu_core::LiuResult;

use crate::packet::Packet;

/// 码流滤镜 trait
///
/// 无状态或有状态均可; 滤镜不改变数据包的产出顺序.
pub trait BitstreamFilter: Send {
    /// 获取滤镜名称
    fn name(&self) -> &str;

    /// 处理一个数据包, 返回零个或多个输出数据包
    fn filter(&mut self, packet: &Packet) -> LiuResult<Vec<Packet>>;
}

/// 透传滤镜: 原样输出每个输入数据包
pub struct NullFilter;

impl NullFilter {
    /// 创建透传滤镜实例 (工厂函数)
    pub fn create() -> LiuResult<Box<dyn BitstreamFilter>> {
        Ok(Box::new(Self))
    }
}

impl BitstreamFilter for NullFilter {
    fn name(&self) -> &str {
        "null"
    }

    fn filter(&mut self, packet: &Packet) -> LiuResult<Vec<Packet>> {
        Ok(vec![packet.clone()])
    }
}
