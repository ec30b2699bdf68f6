//! 外部二进制能力：委托调用方类型自身的编码/解码行为。
//!
//! # 教案式说明
//! - **意图 (Why)**：时间戳等类型已经拥有自己的二进制表示，本 crate 不理解其内部结构，
//!   只负责以统一的长度前缀包裹其负载。
//! - **逻辑 (How)**：编码端调用 [`BinaryMarshal::marshal_binary`] 获得负载，写出长度与负载；
//!   解码端读出长度，取得恰好该长度的窗口，交给 [`BinaryMarshal::unmarshal_binary`]。
//! - **契约 (What)**：能力自身报告的失败会中毒上下文，分别记为
//!   [`CodecError::ExternalMarshal`] 与 [`CodecError::ExternalUnmarshal`]；
//!   上下文已中毒时不会调用能力的任何入口。

use crate::context::Context;
use crate::direction::{Direction, Window};
use crate::error::{CodecError, Result};
use crate::number::length;

/// 自带二进制表示的类型。
pub trait BinaryMarshal {
    /// 能力报告的错误。
    type Error: std::error::Error + Send + Sync + 'static;

    /// 生成负载字节。
    fn marshal_binary(&self) -> Result<Vec<u8>, Self::Error>;

    /// 以恰好一份负载覆盖自身。
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// 编码或解码一个外部能力字段：8 字节长度前缀 + 能力定义的负载。
pub fn external<D, T>(ctx: &mut Context<'_, D>, value: &mut T) -> Result<()>
where
    D: Direction,
    T: BinaryMarshal,
{
    ctx.nested(|ctx| {
        if ctx.is_encoding() {
            let payload = value
                .marshal_binary()
                .map_err(|err| ctx.poison(CodecError::external_marshal(err)))?;
            let len = length(ctx, payload.len())?;
            if let Window::Write(dst) = ctx.raw(len)? {
                dst.copy_from_slice(&payload);
            }
            return Ok(());
        }

        let len = length(ctx, 0)?;
        let outcome = match ctx.raw(len)? {
            Window::Read(src) => value.unmarshal_binary(src),
            Window::Write(_) => Ok(()),
        };
        outcome.map_err(|err| ctx.poison(CodecError::external_unmarshal(err)))
    })
}
