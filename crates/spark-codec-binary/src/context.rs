//! 编解码上下文：持有缓冲与单向中毒状态。
//!
//! # 教案式说明
//! - **意图 (Why)**：一次编码或解码过程中的所有字段操作共享同一个上下文；
//!   上下文是唯一有状态的实体，负责发放字节窗口并记录首个错误。
//! - **逻辑 (How)**：
//!   - [`Context::raw`] 是唯一触碰缓冲的原语，其余编解码器都经由它读写；
//!   - 首个错误写入后永不被覆盖或清除（[`Context::reset`] 开启新一轮编码除外），
//!     之后的所有原语直接返回该错误，不再改动缓冲；
//!   - 嵌套层数由 [`Context::nested`] 统计，并对照 [`Limits`] 检查。
//! - **契约 (What)**：上下文不可跨线程并发使用；一个上下文对应一次编码或解码过程。

use core::fmt;

use bytes::{Bytes, BytesMut};

use crate::config::{ContextConfig, Limits};
use crate::direction::{Decode, Direction, Encode, Mode, Window};
use crate::error::{CodecError, Result};

/// 编码上下文。
pub type Encoder = Context<'static, Encode>;

/// 解码上下文，借用调用方输入。
pub type Decoder<'a> = Context<'a, Decode>;

/// 编解码上下文。
///
/// # 契约说明（What）
/// - 方向由类型参数 `D` 固定，构造后不可改变；
/// - 编码端缓冲为已输出的字节，可增长；解码端缓冲为尚未消费的输入，只会单调缩短；
/// - `error` 初始为空，一旦写入即保持首个错误。
pub struct Context<'a, D: Direction> {
    buf: D::Buffer<'a>,
    error: Option<CodecError>,
    limits: Limits,
    depth: u16,
}

impl<'a, D: Direction> Context<'a, D> {
    fn from_parts(buf: D::Buffer<'a>, limits: Limits) -> Self {
        Self {
            buf,
            error: None,
            limits,
            depth: 0,
        }
    }

    /// 替换约束配置。
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// 当前字节视图：编码端为已写入字节，解码端为尚未消费的字节。中毒后仍可调用。
    pub fn bytes(&self) -> &[u8] {
        D::view(&self.buf)
    }

    /// 当前记录的错误。
    pub fn error(&self) -> Option<&CodecError> {
        self.error.as_ref()
    }

    /// 若已中毒则返回记录的错误。
    pub fn check(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// 以 `err` 中毒上下文，返回最终记录的错误。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：手写编解码器发现非法数据时以 `return Err(ctx.poison(err))` 中止；
    /// - **契约 (What)**：若上下文已中毒，`err` 被丢弃，返回值仍是首个错误；
    /// - **执行逻辑 (How)**：首次中毒输出 `debug` 事件，被丢弃的后续错误只输出 `trace` 事件。
    pub fn poison(&mut self, err: CodecError) -> CodecError {
        match &self.error {
            Some(first) => {
                tracing::trace!(
                    target: "spark_codec_binary",
                    mode = %D::MODE,
                    first = first.code(),
                    discarded = err.code(),
                    "context already poisoned, discarding later error"
                );
                first.clone()
            }
            None => {
                tracing::debug!(
                    target: "spark_codec_binary",
                    mode = %D::MODE,
                    code = err.code(),
                    bytes = self.bytes().len(),
                    depth = self.depth,
                    error = %err,
                    "codec context poisoned"
                );
                self.error = Some(err.clone());
                err
            }
        }
    }

    /// 请求恰好 `n` 字节的窗口。
    ///
    /// # 契约说明（What）
    /// - 已中毒：直接返回记录的错误，不做其他事情；
    /// - 编码端：输出逻辑长度增加 `n`，返回新追加的可写窗口（内容为零，需由调用方填满）；
    ///   累计长度超出可分配上限时以 [`CodecError::LengthOverflow`] 中毒且输出保持不变；
    /// - 解码端：剩余不足 `n` 字节时以 [`CodecError::UnexpectedEndOfBuffer`] 中毒且不发放窗口，
    ///   否则返回头部 `n` 字节并越过它们。
    pub fn raw(&mut self, n: usize) -> Result<Window<'_>> {
        self.check()?;
        if !D::has_room(&self.buf, n) {
            let err = match D::MODE {
                Mode::Encode => CodecError::LengthOverflow { length: n as u64 },
                Mode::Decode => CodecError::UnexpectedEndOfBuffer {
                    requested: n,
                    remaining: self.bytes().len(),
                },
            };
            return Err(self.poison(err));
        }
        Ok(D::acquire(&mut self.buf, n))
    }

    /// 运行期方向标签。
    pub fn mode(&self) -> Mode {
        D::MODE
    }

    /// 是否为编码上下文。
    pub fn is_encoding(&self) -> bool {
        D::MODE == Mode::Encode
    }

    /// 是否为解码上下文。
    pub fn is_decoding(&self) -> bool {
        D::MODE == Mode::Decode
    }

    /// 当前约束配置。
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// 当前嵌套层数。
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// 在下一层嵌套中执行 `f`。
    ///
    /// 组合编解码器（序列、映射、外部能力）经由此入口处理子元素；
    /// 超过 [`Limits::max_depth`] 时以 [`CodecError::DepthLimitExceeded`] 中毒，不执行 `f`。
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.check()?;
        let depth = self.depth.saturating_add(1);
        if let Some(limit) = self.limits.max_depth()
            && depth > limit.get()
        {
            return Err(self.poison(CodecError::DepthLimitExceeded {
                mode: D::MODE,
                depth,
                limit: limit.get(),
            }));
        }

        self.depth = depth;
        let outcome = f(self);
        self.depth -= 1;
        outcome
    }

    /// 校验长度前缀是否满足 [`Limits::max_length`]。
    pub(crate) fn check_length(&mut self, length: usize) -> Result<usize> {
        if let Some(limit) = self.limits.max_length()
            && length > limit
        {
            return Err(self.poison(CodecError::LengthLimitExceeded {
                mode: D::MODE,
                length,
                limit,
            }));
        }
        Ok(length)
    }
}

impl Context<'static, Encode> {
    /// 创建初始容量为零的编码上下文。
    pub fn new() -> Self {
        Self::from_parts(BytesMut::new(), Limits::default())
    }

    /// 创建预留 `capacity` 字节的编码上下文。
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(BytesMut::with_capacity(capacity), Limits::default())
    }

    /// 复用调用方提供的存储作为输出缓冲，原有内容被清空，容量保留。
    pub fn with_backing(mut backing: BytesMut) -> Self {
        backing.clear();
        Self::from_parts(backing, Limits::default())
    }

    /// 按配置创建编码上下文。
    pub fn with_config(config: &ContextConfig) -> Self {
        Self::from_parts(
            BytesMut::with_capacity(config.initial_capacity),
            config.limits,
        )
    }

    /// 清空输出、错误与嵌套计数，保留已分配的存储供下一轮编码复用。
    pub fn reset(&mut self) {
        tracing::debug!(
            target: "spark_codec_binary",
            discarded = self.buf.len(),
            capacity = self.buf.capacity(),
            poisoned = self.error.is_some(),
            "resetting encoder for reuse"
        );
        self.buf.clear();
        self.error = None;
        self.depth = 0;
    }

    /// 已写入的字节数。
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否尚未写入任何字节。
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 输出缓冲当前容量。
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// 取回输出缓冲（包括容量），可交给 [`Context::with_backing`] 复用。
    pub fn into_buffer(self) -> BytesMut {
        self.buf
    }

    /// 冻结已写入的字节。不检查错误状态。
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// 结束编码：未中毒时返回输出，否则返回记录的错误。
    pub fn finish(self) -> Result<Bytes> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.buf.freeze()),
        }
    }
}

impl Default for Context<'static, Encode> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Context<'a, Decode> {
    /// 创建读取 `input` 的解码上下文。空输入同样合法，任何非零窗口请求都会中毒。
    pub fn new(input: &'a [u8]) -> Self {
        Self::from_parts(input, Limits::default())
    }

    /// 按配置创建解码上下文，`initial_capacity` 被忽略。
    pub fn with_config(input: &'a [u8], config: &ContextConfig) -> Self {
        Self::from_parts(input, config.limits)
    }

    /// 尚未消费的字节数。
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// 结束解码：未中毒时返回尚未消费的尾部字节，否则返回记录的错误。
    pub fn finish(self) -> Result<&'a [u8]> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.buf),
        }
    }
}

impl<D: Direction> fmt::Debug for Context<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("mode", &D::MODE)
            .field("bytes", &self.bytes().len())
            .field("error", &self.error)
            .field("limits", &self.limits)
            .field("depth", &self.depth)
            .finish()
    }
}
