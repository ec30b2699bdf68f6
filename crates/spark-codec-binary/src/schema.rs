//! 用户类型的字段枚举契约与整轮编解码入口。
//!
//! # 使用概览（How）
//! - 为类型实现 [`Schema::codec`]：按固定顺序对每个字段调用一个编解码函数，
//!   同一份代码同时服务编码与解码；
//! - `T::codec` 本身符合编解码函数签名，可直接作为 [`crate::seq`]/[`crate::map`] 的元素函数实现嵌套；
//! - [`encode`]/[`decode`] 覆盖最常见的“一次性”场景，[`encode_into`] 复用编码缓冲。
//!
//! 字段函数无需逐个检查返回值：上下文在首个错误后中毒，后续调用全部空转，
//! 在末尾返回 `ctx.check()` 即可得到首个错误。

use bytes::Bytes;

use crate::context::{Context, Decoder, Encoder};
use crate::direction::Direction;
use crate::error::Result;

/// 调用方手写的字段枚举。
pub trait Schema {
    /// 按固定顺序编码或解码 `value` 的全部字段。
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()>;
}

/// 以 [`Schema`] 编码或解码一个值，适合作为组合编解码器的元素函数。
pub fn schema<D, T>(ctx: &mut Context<'_, D>, value: &mut T) -> Result<()>
where
    D: Direction,
    T: Schema,
{
    T::codec(ctx, value)?;
    ctx.check()
}

/// 编码 `value` 并返回输出字节。
///
/// 编码端同样以 `&mut` 接收值，与解码共享同一份字段枚举；编码不会修改 `value`。
pub fn encode<T: Schema>(value: &mut T) -> Result<Bytes> {
    let mut ctx = Encoder::new();
    schema(&mut ctx, value)?;
    ctx.finish()
}

/// 复位 `encoder` 后将 `value` 编码进其缓冲，已有容量被复用。
///
/// 成功后可通过 [`Context::bytes`] 读取输出。
pub fn encode_into<T: Schema>(encoder: &mut Encoder, value: &mut T) -> Result<()> {
    encoder.reset();
    schema(encoder, value)
}

/// 从 `input` 解码一个新值。未消费完的尾部字节被忽略。
pub fn decode<T: Schema + Default>(input: &[u8]) -> Result<T> {
    let mut value = T::default();
    decode_into(input, &mut value)?;
    Ok(value)
}

/// 从 `input` 解码并覆盖 `value`。
///
/// 失败时 `value` 保留首个错误之前已解码的字段，其余字段保持调用前的值。
pub fn decode_into<T: Schema>(input: &[u8], value: &mut T) -> Result<()> {
    let mut ctx = Decoder::new(input);
    schema(&mut ctx, value)
}
