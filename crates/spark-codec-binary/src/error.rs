//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义编解码上下文可能记录的全部失败语义，上下文“中毒”后保存的正是这里的值；
//! - 每个变体附带稳定错误码，沿用 `<领域>.<语义>` 的命名约定，便于日志与指标聚合。
//!
//! ## 设计要求（What）
//! - 错误必须可 `Clone`：中毒后的每一次调用都要返回与首个错误完全相同的值；
//! - 外部能力（`BinaryMarshal`）的失败以 `Arc` 共享原因，克隆不会复制底层错误；
//! - 平台不兼容属于致命前置条件，不在此枚举中出现，见 [`crate::platform`]。

use alloc::borrow::Cow;
use alloc::sync::Arc;

use thiserror::Error;

use crate::direction::Mode;

/// 外部能力错误的共享句柄。
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// 本 crate 统一使用的结果别名。
pub type Result<T, E = CodecError> = core::result::Result<T, E>;

/// 稳定错误码。
///
/// 错误码一经发布即视为契约，仅允许新增，不允许修改既有取值。
pub mod codes {
    /// 解码请求的字节数超过剩余输入。
    pub const UNEXPECTED_END: &str = "codec.unexpected_end";
    /// 外部能力编码失败。
    pub const EXTERNAL_MARSHAL: &str = "codec.external_marshal";
    /// 外部能力解码失败。
    pub const EXTERNAL_UNMARSHAL: &str = "codec.external_unmarshal";
    /// 字符串负载不是合法 UTF-8。
    pub const INVALID_UTF8: &str = "codec.invalid_utf8";
    /// 长度前缀超出本平台 `usize` 表示范围。
    pub const LENGTH_OVERFLOW: &str = "codec.length_overflow";
    /// 定宽整数无法落入本平台原生宽度。
    pub const INTEGER_OVERFLOW: &str = "codec.integer_overflow";
    /// 长度前缀超过配置的上限。
    pub const LENGTH_LIMIT: &str = "codec.budget_exceeded.length";
    /// 嵌套深度超过配置的上限。
    pub const DEPTH_LIMIT: &str = "codec.budget_exceeded.depth";
    /// 调用方自定义编解码器主动中止。
    pub const CUSTOM: &str = "codec.custom";
}

/// 编解码上下文记录的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：上下文采用“首错优先”的单向中毒模型，所有原语在中毒后都返回同一个错误，
///   因此错误本身需要廉价克隆并可比较。
/// - **契约 (What)**：
///   - `code()` 返回稳定错误码，见 [`codes`]；
///   - `PartialEq` 对结构化变体逐字段比较，对外部原因比较 `Arc` 指针是否同一；
///   - 所有变体均满足 `Send + Sync + 'static`。
/// - **执行逻辑 (How)**：外部错误在进入上下文时包装为 [`SharedError`]，之后只做引用计数克隆。
#[derive(Clone, Debug, Error)]
pub enum CodecError {
    /// 解码阶段剩余字节不足。
    #[error("unexpected end of buffer: requested {requested} bytes but only {remaining} remain")]
    UnexpectedEndOfBuffer {
        /// 本次请求的窗口大小。
        requested: usize,
        /// 请求时尚未消费的字节数。
        remaining: usize,
    },

    /// 外部能力的编码入口返回失败。
    #[error("external binary marshal failed: {0}")]
    ExternalMarshal(#[source] SharedError),

    /// 外部能力的解码入口返回失败。
    #[error("external binary unmarshal failed: {0}")]
    ExternalUnmarshal(#[source] SharedError),

    /// 字符串负载不是合法 UTF-8，`valid_up_to` 为合法前缀长度。
    #[error("string payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// 长度无法在本平台的 `usize` 中表示：解码时为线上长度前缀，编码时为输出累计长度。
    #[error("length {length} does not fit in usize on this platform")]
    LengthOverflow { length: u64 },

    /// 8 字节线上整数无法落入本平台的原生宽度整数。
    #[error("wire integer {value} does not fit in {target} on this platform")]
    IntegerOverflow { value: i128, target: &'static str },

    /// 长度前缀超过 [`crate::Limits::max_length`]。
    #[error("{mode} length {length} exceeds configured limit {limit}")]
    LengthLimitExceeded {
        mode: Mode,
        length: usize,
        limit: usize,
    },

    /// 嵌套深度超过 [`crate::Limits::max_depth`]。
    #[error("{mode} nesting depth {depth} exceeds configured limit {limit}")]
    DepthLimitExceeded { mode: Mode, depth: u16, limit: u16 },

    /// 调用方自定义编解码器中止本次处理。
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl CodecError {
    /// 包装外部编码失败。
    pub fn external_marshal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ExternalMarshal(Arc::new(err))
    }

    /// 包装外部解码失败。
    pub fn external_unmarshal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ExternalUnmarshal(Arc::new(err))
    }

    /// 构造自定义错误，供手写编解码器在校验失败时调用 [`crate::Context::poison`]。
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedEndOfBuffer { .. } => codes::UNEXPECTED_END,
            Self::ExternalMarshal(_) => codes::EXTERNAL_MARSHAL,
            Self::ExternalUnmarshal(_) => codes::EXTERNAL_UNMARSHAL,
            Self::InvalidUtf8 { .. } => codes::INVALID_UTF8,
            Self::LengthOverflow { .. } => codes::LENGTH_OVERFLOW,
            Self::IntegerOverflow { .. } => codes::INTEGER_OVERFLOW,
            Self::LengthLimitExceeded { .. } => codes::LENGTH_LIMIT,
            Self::DepthLimitExceeded { .. } => codes::DEPTH_LIMIT,
            Self::Custom(_) => codes::CUSTOM,
        }
    }

    /// 是否由输入截断引起。
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, Self::UnexpectedEndOfBuffer { .. })
    }
}

impl PartialEq for CodecError {
    fn eq(&self, other: &Self) -> bool {
        use CodecError::*;

        match (self, other) {
            (
                UnexpectedEndOfBuffer {
                    requested: a,
                    remaining: b,
                },
                UnexpectedEndOfBuffer {
                    requested: c,
                    remaining: d,
                },
            ) => a == c && b == d,
            (ExternalMarshal(a), ExternalMarshal(b))
            | (ExternalUnmarshal(a), ExternalUnmarshal(b)) => Arc::ptr_eq(a, b),
            (InvalidUtf8 { valid_up_to: a }, InvalidUtf8 { valid_up_to: b }) => a == b,
            (LengthOverflow { length: a }, LengthOverflow { length: b }) => a == b,
            (
                IntegerOverflow {
                    value: a,
                    target: x,
                },
                IntegerOverflow {
                    value: b,
                    target: y,
                },
            ) => a == b && x == y,
            (
                LengthLimitExceeded {
                    mode: m,
                    length: a,
                    limit: x,
                },
                LengthLimitExceeded {
                    mode: n,
                    length: b,
                    limit: y,
                },
            ) => m == n && a == b && x == y,
            (
                DepthLimitExceeded {
                    mode: m,
                    depth: a,
                    limit: x,
                },
                DepthLimitExceeded {
                    mode: n,
                    depth: b,
                    limit: y,
                },
            ) => m == n && a == b && x == y,
            (Custom(a), Custom(b)) => a == b,
            _ => false,
        }
    }
}
