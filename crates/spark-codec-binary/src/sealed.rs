//! 内部 sealed 标记，限定 [`crate::Direction`] 与 [`crate::Number`] 的实现者集合。
//!
//! # 契约说明（What）
//! - 方向只有编码与解码两种；数值类型只覆盖线上格式定义过的定宽整数与浮点；
//! - 下游无法为自定义类型实现上述 trait，新增实现只能在本 crate 内完成。
pub(crate) trait Sealed {}
