//! 时间戳约定.
//!
//! 基于 `time_base` 的时间戳系统: 实际时间 (秒) = pts * time_base.
//! 数据包与帧直接携带 `pts: i64` + `time_base: Rational` 字段,
//! 本模块只定义共用的哨兵值.

/// 表示"未定义"的时间戳值
pub const NOPTS_VALUE: i64 = i64::MIN;
