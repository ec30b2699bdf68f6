//! 上下文配置：长度与嵌套深度约束。
//!
//! # 设计背景（Why）
//! - 长度前缀来自不可信输入，解码序列时会按声明的元素数一次性分配存储；
//!   没有上限时，一个伪造的 8 字节前缀就能触发巨量分配。
//! - 编码与解码共享同一套约束，违反时以带方向的错误中毒上下文，便于定位是哪一端越界。
//!
//! # 契约说明（What）
//! - 默认无任何约束，此时行为与未配置时完全一致；
//! - `max_length` 作用于所有长度前缀：字符串、字节序列、通用序列元素数、映射条目数、外部负载；
//! - `max_depth` 作用于组合编解码器的嵌套层数（序列、映射、外部能力以及 [`crate::Context::nested`]）。

use core::num::NonZeroU16;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 长度与深度约束。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default, deny_unknown_fields))]
pub struct Limits {
    max_length: Option<usize>,
    max_depth: Option<NonZeroU16>,
}

impl Limits {
    /// 不设任何约束。
    pub const fn unbounded() -> Self {
        Self {
            max_length: None,
            max_depth: None,
        }
    }

    /// 设置长度前缀上限。
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// 设置嵌套深度上限。
    pub const fn with_max_depth(mut self, max_depth: NonZeroU16) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// 长度前缀上限。
    pub const fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// 嵌套深度上限。
    pub const fn max_depth(&self) -> Option<NonZeroU16> {
        self.max_depth
    }

    /// 是否未设置任何约束。
    pub const fn is_unbounded(&self) -> bool {
        self.max_length.is_none() && self.max_depth.is_none()
    }
}

/// 构造上下文所需的全部配置。
///
/// `initial_capacity` 仅对编码上下文生效，表示输出缓冲预留的字节数。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default, deny_unknown_fields))]
pub struct ContextConfig {
    /// 编码缓冲的初始容量。
    pub initial_capacity: usize,
    /// 长度与深度约束。
    pub limits: Limits,
}

impl ContextConfig {
    /// 以给定约束构造配置，初始容量为零。
    pub const fn with_limits(limits: Limits) -> Self {
        Self {
            initial_capacity: 0,
            limits,
        }
    }

    /// 调整编码缓冲的初始容量。
    pub const fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
