//! 编解码方向：以两个标记类型在编译期区分编码与解码。
//!
//! # 教案式说明
//! - **意图 (Why)**：同一份字段枚举代码既要写出字节又要读回字节，方向必须由上下文类型携带，
//!   而不是由调用方在每个字段上判断。
//! - **逻辑 (How)**：[`Direction`] 为密封 trait，只有 [`Encode`] 与 [`Decode`] 两个实现；
//!   每个方向通过关联类型声明自己的缓冲表示，并负责发放字节窗口。
//! - **契约 (What)**：[`Direction::MODE`] 提供运行期可查询的 [`Mode`] 标签；
//!   字节窗口 [`Window`] 的变体与方向一一对应，编码端只会得到 `Write`，解码端只会得到 `Read`。

use core::fmt;

use bytes::BytesMut;

use crate::sealed::Sealed;

/// 运行期方向标签。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 向缓冲追加字节。
    Encode,
    /// 从缓冲消费字节。
    Decode,
}

impl Mode {
    /// 用于错误消息与日志的角色名。
    pub fn label(self) -> &'static str {
        match self {
            Mode::Encode => "encoder",
            Mode::Decode => "decoder",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一次原语操作获得的字节窗口。
///
/// 编码端拿到的是刚追加到输出末尾的可写区域，调用方负责填满；
/// 解码端拿到的是输入头部恰好 `n` 字节的只读区域，窗口发放时这些字节已被消费。
#[derive(Debug)]
pub enum Window<'w> {
    /// 编码窗口，初始内容为零。
    Write(&'w mut [u8]),
    /// 解码窗口。
    Read(&'w [u8]),
}

impl Window<'_> {
    /// 窗口长度。
    pub fn len(&self) -> usize {
        match self {
            Window::Write(dst) => dst.len(),
            Window::Read(src) => src.len(),
        }
    }

    /// 窗口是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 编解码方向契约。
///
/// # 契约说明（What）
/// - `Buffer<'a>`：该方向持有的缓冲。编码端独占可增长的 [`BytesMut`]，解码端借用调用方输入；
/// - `has_room`：`acquire` 的前置检查，解码端在剩余字节不足时返回 `false`，
///   编码端在追加后的总长度超出可分配上限（`isize::MAX`）时返回 `false`；
/// - `acquire`：在 `has_room` 成立的前提下发放窗口，编码端扩展逻辑长度，解码端推进视图；
/// - `view`：当前字节视图，编码端为已写入字节，解码端为尚未消费的字节。
///
/// trait 已密封，下游无法新增方向。
pub trait Direction: Sealed + Sized + 'static {
    /// 运行期方向标签。
    const MODE: Mode;

    /// 该方向持有的缓冲类型。
    type Buffer<'a>;

    #[doc(hidden)]
    fn has_room(buf: &Self::Buffer<'_>, n: usize) -> bool;

    #[doc(hidden)]
    fn acquire<'w>(buf: &'w mut Self::Buffer<'_>, n: usize) -> Window<'w>;

    #[doc(hidden)]
    fn view<'w>(buf: &'w Self::Buffer<'_>) -> &'w [u8];
}

/// 编码方向标记。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Encode;

/// 解码方向标记。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decode;

impl Sealed for Encode {}
impl Sealed for Decode {}

impl Direction for Encode {
    const MODE: Mode = Mode::Encode;

    type Buffer<'a> = BytesMut;

    fn has_room(buf: &BytesMut, n: usize) -> bool {
        buf.len()
            .checked_add(n)
            .is_some_and(|needed| needed <= isize::MAX as usize)
    }

    fn acquire<'w>(buf: &'w mut BytesMut, n: usize) -> Window<'w> {
        let start = buf.len();
        // `has_room` 已保证不溢出。
        let needed = start.saturating_add(n);
        if needed > buf.capacity() {
            tracing::trace!(
                target: "spark_codec_binary",
                written = start,
                needed,
                capacity = buf.capacity(),
                "growing encode buffer"
            );
        }
        buf.resize(needed, 0);
        Window::Write(&mut buf[start..])
    }

    fn view<'w>(buf: &'w BytesMut) -> &'w [u8] {
        buf
    }
}

impl Direction for Decode {
    const MODE: Mode = Mode::Decode;

    type Buffer<'a> = &'a [u8];

    fn has_room(buf: &&[u8], n: usize) -> bool {
        n <= buf.len()
    }

    fn acquire<'w>(buf: &'w mut &[u8], n: usize) -> Window<'w> {
        let input: &[u8] = *buf;
        let (head, tail) = input.split_at(n);
        *buf = tail;
        Window::Read(head)
    }

    fn view<'w>(buf: &'w &[u8]) -> &'w [u8] {
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_acquire_appends_zeroed_window() {
        let mut buf = BytesMut::from(&b"ab"[..]);
        match Encode::acquire(&mut buf, 3) {
            Window::Write(dst) => {
                assert_eq!(dst, &[0, 0, 0]);
                dst.copy_from_slice(b"cde");
            }
            Window::Read(_) => panic!("encoder must hand out writable windows"),
        }
        assert_eq!(Encode::view(&buf), b"abcde");
    }

    #[test]
    fn encode_has_room_rejects_unrepresentable_totals() {
        let buf = BytesMut::from(&b"ab"[..]);
        assert!(Encode::has_room(&buf, 1024));
        assert!(!Encode::has_room(&buf, usize::MAX));
        assert!(!Encode::has_room(&buf, isize::MAX as usize));
        assert!(Encode::has_room(&BytesMut::new(), 0));
    }

    #[test]
    fn decode_acquire_advances_view() {
        let input = [1u8, 2, 3, 4];
        let mut buf: &[u8] = &input;
        assert!(Decode::has_room(&buf, 4));
        assert!(!Decode::has_room(&buf, 5));
        match Decode::acquire(&mut buf, 3) {
            Window::Read(src) => assert_eq!(src, &[1, 2, 3]),
            Window::Write(_) => panic!("decoder must hand out readable windows"),
        }
        assert_eq!(Decode::view(&buf), &[4]);
    }

    #[test]
    fn mode_labels_match_roles() {
        assert_eq!(Encode::MODE.to_string(), "encoder");
        assert_eq!(Decode::MODE.label(), "decoder");
    }
}
