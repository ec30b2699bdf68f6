//! 定宽数值编解码。
//!
//! # 教案式说明
//! - **意图 (Why)**：所有长度前缀与数值字段都走同一条小端定宽路径，线上格式只有一种整数形状。
//! - **逻辑 (How)**：
//!   - 整数按 `size_of::<T>()` 字节小端写出，读回时按二进制补码位模式还原，与符号无关；
//!   - 浮点数不拥有独立编码：先经 `to_bits` 转为同宽无符号整数，再走整数路径，
//!     因此 NaN 负载与正负无穷都逐位保留；对应的尺寸/对齐前置条件见 [`crate::platform`]；
//!   - `usize`/`isize` 是平台原生宽度整数，线上固定为 8 字节，读回时若超出本平台宽度则中毒。
//! - **契约 (What)**：[`Number`] 已密封，实现者集合与线上格式一致。

use crate::context::Context;
use crate::direction::{Direction, Window};
use crate::error::{CodecError, Result};
use crate::sealed::Sealed;

/// 可经 [`number`] 编解码的定宽数值。
pub trait Number: Copy + Sealed {
    /// 线上宽度（字节）。
    const WIDTH: usize;

    #[doc(hidden)]
    fn write_le(self, dst: &mut [u8]);

    #[doc(hidden)]
    fn read_le(src: &[u8]) -> Result<Self>;
}

/// 将长度恰为 `N` 的窗口复制为定长数组。窗口长度由 [`Context::raw`] 保证。
fn le_array<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(src);
    bytes
}

macro_rules! fixed_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sealed for $ty {}

            impl Number for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(src: &[u8]) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(le_array(src)))
                }
            }
        )*
    };
}

fixed_width!(u8, u16, u32, u64, i8, i16, i32, i64);

macro_rules! bit_pattern {
    ($($float:ty => $bits:ty),* $(,)?) => {
        $(
            const _: () = crate::platform::ensure_reinterpretable::<$float, $bits>();

            impl Sealed for $float {}

            impl Number for $float {
                const WIDTH: usize = <$bits as Number>::WIDTH;

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    self.to_bits().write_le(dst);
                }

                #[inline]
                fn read_le(src: &[u8]) -> Result<Self> {
                    <$bits as Number>::read_le(src).map(<$float>::from_bits)
                }
            }
        )*
    };
}

bit_pattern!(f32 => u32, f64 => u64);

macro_rules! native_width {
    ($($native:ident => $wire:ty),* $(,)?) => {
        $(
            impl Sealed for $native {}

            impl Number for $native {
                const WIDTH: usize = <$wire as Number>::WIDTH;

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    // 平台原生宽度不超过 8 字节，由 `platform` 模块在编译期断言。
                    (self as $wire).write_le(dst);
                }

                #[inline]
                fn read_le(src: &[u8]) -> Result<Self> {
                    let wide = <$wire as Number>::read_le(src)?;
                    $native::try_from(wide).map_err(|_| CodecError::IntegerOverflow {
                        value: i128::from(wide),
                        target: stringify!($native),
                    })
                }
            }
        )*
    };
}

native_width!(usize => u64, isize => i64);

/// 编码或解码一个定宽数值。
///
/// 编码端读取 `*value` 写出 `T::WIDTH` 字节；解码端读入同样宽度并覆盖 `*value`。
/// 失败时 `*value` 保持原值。
pub fn number<D, T>(ctx: &mut Context<'_, D>, value: &mut T) -> Result<()>
where
    D: Direction,
    T: Number,
{
    let decoded = match ctx.raw(T::WIDTH)? {
        Window::Write(dst) => {
            value.write_le(dst);
            return Ok(());
        }
        Window::Read(src) => T::read_le(src),
    };

    match decoded {
        Ok(read) => {
            *value = read;
            Ok(())
        }
        Err(err) => Err(ctx.poison(err)),
    }
}

/// 编码或解码一个 8 字节长度前缀并校验约束。
///
/// 编码端写出 `current` 并原样返回；解码端忽略 `current`，返回读到的长度。
pub(crate) fn length<D: Direction>(ctx: &mut Context<'_, D>, current: usize) -> Result<usize> {
    let mut wire = current as u64;
    number(ctx, &mut wire)?;
    match usize::try_from(wire) {
        Ok(length) => ctx.check_length(length),
        Err(_) => Err(ctx.poison(CodecError::LengthOverflow { length: wire })),
    }
}
