#![deny(unsafe_code)]
#![allow(private_bounds)]
#![doc = "spark-codec-binary: 调用方逐字段驱动的对称二进制编解码上下文。"]
#![doc = ""]
#![doc = "== 线上格式 =="]
#![doc = "1. 定宽整数按自身宽度小端写出；浮点按同宽无符号整数的位模式写出；`usize`/`isize` 固定 8 字节。"]
#![doc = "2. 字符串、字节序列、序列、映射与外部负载都以 8 字节小端长度前缀开头，随后是负载或元素。"]
#![doc = "3. 格式不自描述：没有魔数、版本号、类型标签与字段名，读写双方必须以同样的顺序枚举字段。"]
#![doc = ""]
#![doc = "== 使用方式 =="]
#![doc = "为类型实现 [`Schema`]，在 `codec` 中按顺序对每个字段调用 [`number`]、[`string`]、[`seq`] 等编解码函数；"]
#![doc = "同一份实现在 [`Encoder`] 上写出字节，在 [`Decoder`] 上读回字节。首个失败会让上下文“中毒”，"]
#![doc = "此后所有调用都返回同一个错误，调用方只需在末尾检查一次 [`Context::check`]。"]

extern crate alloc;

mod sealed;

pub mod collection;
pub mod config;
pub mod context;
pub mod direction;
pub mod error;
pub mod external;
pub mod number;
pub mod platform;
pub mod schema;
pub mod text;

pub use collection::{MapLike, map, seq};
pub use config::{ContextConfig, Limits};
pub use context::{Context, Decoder, Encoder};
pub use direction::{Decode, Direction, Encode, Mode, Window};
pub use error::{CodecError, Result, SharedError, codes};
pub use external::{BinaryMarshal, external};
pub use number::{Number, number};
pub use schema::{Schema, decode, decode_into, encode, encode_into, schema};
pub use text::{bytes, string};
