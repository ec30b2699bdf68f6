//! spark-codec-binary-fuzz 公共支持库。
//!
//! # 教案式定位
//! - **Why**：两个 fuzz target 与语料回归测试共享同一份记录定义与检查逻辑，
//!   CI 中运行常规 `cargo test` 即可重放，无需 libFuzzer 运行时。
//! - **What**：[`FuzzRecord`] 覆盖全部原语与递归嵌套；[`check_round_trip`] 是 `round_trip` 的主体，
//!   [`decode_under_limits`] 与 [`decode_unbounded`] 共同构成 `decode_arbitrary` 的主体。
//! - **How**：检查逻辑以纯函数暴露，发现违例时直接 panic，交给 libFuzzer 记录崩溃样本。

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use spark_codec_binary::{
    Context, ContextConfig, Decoder, Direction, Limits, Result, Schema, bytes, encode, map,
    number, seq, string,
};

/// 解码任意输入时使用的约束：足以容纳正常样本，又能阻止伪造前缀触发巨量分配或深递归。
pub const FUZZ_LIMITS: Limits = Limits::unbounded()
    .with_max_length(64 * 1024)
    .with_max_depth(match core::num::NonZeroU16::new(16) {
        Some(depth) => depth,
        None => panic!("depth limit must be non-zero"),
    });

/// 递归节点，用于探索嵌套深度约束。
#[derive(Debug, Default, Clone, Arbitrary)]
pub struct Node {
    pub value: u8,
    pub children: Vec<Node>,
}

impl Node {
    /// 树的层数，叶子为 1。显式栈迭代，任意深度的随机树都不会在这里耗尽调用栈。
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

impl Schema for Node {
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()> {
        number(ctx, &mut value.value)?;
        seq(ctx, &mut value.children, Node::codec)
    }
}

/// 列表元素：浮点与字符串序列。
#[derive(Debug, Default, Clone, Arbitrary)]
pub struct Item {
    pub weight: f32,
    pub tags: Vec<String>,
}

impl Schema for Item {
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()> {
        number(ctx, &mut value.weight)?;
        seq(ctx, &mut value.tags, string)
    }
}

/// Fuzz 主记录。
#[derive(Debug, Default, Clone, Arbitrary)]
pub struct FuzzRecord {
    pub flags: u8,
    pub delta: i16,
    pub count: u32,
    pub offset: i64,
    pub cursor: usize,
    pub ratio: f64,
    pub label: String,
    pub blob: Vec<u8>,
    pub items: Vec<Item>,
    pub index: BTreeMap<u16, String>,
    pub tree: Node,
}

impl Schema for FuzzRecord {
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()> {
        number(ctx, &mut value.flags)?;
        number(ctx, &mut value.delta)?;
        number(ctx, &mut value.count)?;
        number(ctx, &mut value.offset)?;
        number(ctx, &mut value.cursor)?;
        number(ctx, &mut value.ratio)?;
        string(ctx, &mut value.label)?;
        bytes(ctx, &mut value.blob)?;
        seq(ctx, &mut value.items, Item::codec)?;
        map(ctx, &mut value.index, number, string)?;
        Node::codec(ctx, &mut value.tree)
    }
}

/// 编码 → 解码 → 再编码，两次编码输出必须逐字节一致，且解码恰好消费全部输入。
///
/// 比较字节而不是比较记录本身，NaN 负载因此同样受检。
pub fn check_round_trip(record: &FuzzRecord) {
    let mut original = record.clone();
    // 编码端未配置约束，随机记录没有任何失败来源。
    let wire = match encode(&mut original) {
        Ok(wire) => wire,
        Err(err) => panic!("encoding an arbitrary record failed: {err}"),
    };

    let mut ctx = Decoder::new(&wire);
    let mut decoded = FuzzRecord::default();
    if let Err(err) = FuzzRecord::codec(&mut ctx, &mut decoded) {
        panic!("decoding freshly encoded bytes failed: {err}");
    }
    assert_eq!(ctx.remaining(), 0, "decoder left unconsumed bytes");

    match encode(&mut decoded) {
        Ok(again) => assert_eq!(again, wire, "re-encoding changed the wire bytes"),
        Err(err) => panic!("re-encoding a decoded record failed: {err}"),
    }
}

/// 在 [`FUZZ_LIMITS`] 下解码任意字节，不得 panic；若解码成功，其再编码结果必须稳定。
pub fn decode_under_limits(data: &[u8]) {
    let config = ContextConfig::with_limits(FUZZ_LIMITS);
    decode_checked(Decoder::with_config(data, &config));
}

/// 以默认（无约束）解码上下文解码任意字节。
///
/// 伪造的元素个数只能让上下文中毒，不能触发 panic 或按个数分配；
/// 递归深度受输入长度约束：每层至少消费 9 字节，libFuzzer 默认 4096 字节的输入上限约束在数百层以内。
pub fn decode_unbounded(data: &[u8]) {
    decode_checked(Decoder::new(data));
}

fn decode_checked(mut ctx: Decoder<'_>) {
    let mut decoded = FuzzRecord::default();
    if FuzzRecord::codec(&mut ctx, &mut decoded).is_err() {
        assert!(ctx.error().is_some(), "failure must leave the context poisoned");
        return;
    }

    check_round_trip(&decoded);
}
