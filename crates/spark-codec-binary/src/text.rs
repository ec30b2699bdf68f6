//! 字符串与字节序列编解码：8 字节长度前缀 + 原始负载。
//!
//! 两者线上形状相同；字节序列是通用序列在 `u8` 元素上的特化，直接整段拷贝负载，
//! 不逐元素调用数值编解码器。

use crate::context::Context;
use crate::direction::{Direction, Window};
use crate::error::{CodecError, Result};
use crate::number::length;

/// 编码或解码一个字符串。
///
/// # 契约说明（What）
/// - 负载为字符串的原始 UTF-8 字节，不做任何字符集转换，也没有终止符；
/// - 解码端只校验负载是合法 UTF-8，不合法时以 [`CodecError::InvalidUtf8`] 中毒并保持 `*value` 不变；
/// - 成功解码后 `*value` 的内容恰为负载，原有分配在容量足够时被复用。
pub fn string<D: Direction>(ctx: &mut Context<'_, D>, value: &mut String) -> Result<()> {
    let len = length(ctx, value.len())?;
    let outcome = match ctx.raw(len)? {
        Window::Write(dst) => {
            dst.copy_from_slice(value.as_bytes());
            Ok(())
        }
        Window::Read(src) => match core::str::from_utf8(src) {
            Ok(text) => {
                value.clear();
                value.push_str(text);
                Ok(())
            }
            Err(err) => Err(CodecError::InvalidUtf8 {
                valid_up_to: err.valid_up_to(),
            }),
        },
    };
    outcome.map_err(|err| ctx.poison(err))
}

/// 编码或解码一段字节序列。
///
/// 解码端用负载整体替换 `*value` 的内容。
pub fn bytes<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Vec<u8>) -> Result<()> {
    let len = length(ctx, value.len())?;
    match ctx.raw(len)? {
        Window::Write(dst) => dst.copy_from_slice(value),
        Window::Read(src) => {
            value.clear();
            value.extend_from_slice(src);
        }
    }
    Ok(())
}
