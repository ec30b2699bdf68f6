//! 位模式重解释的平台前置条件。
//!
//! # 教案式说明
//! - **意图 (Why)**：浮点数没有独立的线上编码，而是按同宽无符号整数的位模式写出。
//!   这要求两种类型尺寸相同、对齐兼容；若某个平台不满足，继续编码只会静默写出错误字节。
//! - **逻辑 (How)**：
//!   - [`can_reinterpret`] 是 `const fn`，按“尺寸相等、源对齐不小于目标对齐且为其整数倍”判定；
//!   - [`ensure_reinterpretable`] 同为 `const fn`，不兼容时直接 panic，绝不返回可恢复错误；
//!   - 浮点数的 `Number` 实现在 `const` 上下文中调用它，不兼容的平台在编译期即失败。
//! - **契约 (What)**：线上长度前缀与原生宽度整数固定为 8 字节，因此同样断言 `usize`/`isize`
//!   不宽于 64 位。

use core::mem::{align_of, size_of};

/// 判断 `T` 的值能否按 `U` 的位模式读写。
pub const fn can_reinterpret<T, U>() -> bool {
    size_of::<T>() == size_of::<U>()
        && align_of::<T>() >= align_of::<U>()
        && align_of::<T>() % align_of::<U>() == 0
}

/// 确认 `T` 与 `U` 可互相重解释，否则以“平台不兼容”终止。
///
/// 在 `const` 上下文中调用时，失败表现为编译错误；运行期调用则直接 panic。
///
/// # Panics
/// 尺寸或对齐不满足 [`can_reinterpret`] 时 panic。这代表平台违背了本库的基本假设，
/// 而不是输入数据出错。
pub const fn ensure_reinterpretable<T, U>() {
    assert!(
        can_reinterpret::<T, U>(),
        "platform incompatible: size or alignment does not permit bit reinterpretation"
    );
}
const _: () = assert!(
    size_of::<usize>() <= size_of::<u64>(),
    "platform incompatible: usize is wider than the 8-byte wire width"
);
