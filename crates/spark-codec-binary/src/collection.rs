//! 通用序列与关联映射编解码。
//!
//! # 教案式说明
//! - **意图 (Why)**：集合本身只负责写出/读回元素个数，元素的编解码交给调用方提供的函数，
//!   该函数可以是任意原语或另一个组合编解码器，从而支持任意层级嵌套。
//! - **逻辑 (How)**：
//!   - 元素个数走 8 字节长度前缀，受 [`crate::Limits::max_length`] 约束；
//!   - 子元素在 [`Context::nested`] 中处理，受 [`crate::Limits::max_depth`] 约束；
//!   - 元素函数一旦失败立即停止迭代，不再处理后续元素。
//! - **契约 (What)**：失败后的目标值是确定的：序列中未处理的位置保持原值，
//!   映射中已插入的条目保留、未处理的条目不会插入。
//! - **预分配 (Trade-offs)**：解码端读到的元素个数来自不可信输入，预留空间不超过剩余字节数，
//!   新位置在处理到时才逐个追加；伪造的超大个数会在第一个缺失的元素处中毒，而不是触发巨量分配。

use core::hash::{BuildHasher, Hash};
use std::collections::{BTreeMap, HashMap};

use crate::context::Context;
use crate::direction::Direction;
use crate::error::Result;
use crate::number::length;

/// 编码或解码一个序列。
///
/// # 契约说明（What）
/// - 编码：写出 `items.len()`，然后按顺序对每个元素调用一次 `element`；
/// - 解码：读出元素个数 `count`，长于 `count` 的部分被截断，已有的前缀元素原样保留并交给 `element` 覆盖；
///   不足的位置在处理到时以 `T::default()` 追加，成功后序列恰有 `count` 个元素；
/// - `element` 失败时停止迭代：已有的后续位置保持原值，尚未追加的位置不会出现在序列中。
pub fn seq<'a, D, T, F>(ctx: &mut Context<'a, D>, items: &mut Vec<T>, mut element: F) -> Result<()>
where
    D: Direction,
    T: Default,
    F: FnMut(&mut Context<'a, D>, &mut T) -> Result<()>,
{
    let count = length(ctx, items.len())?;
    if ctx.is_encoding() {
        return ctx.nested(|ctx| {
            for item in items.iter_mut() {
                element(ctx, item)?;
            }
            Ok(())
        });
    }

    items.truncate(count);
    let missing = count - items.len();
    items.reserve(missing.min(ctx.bytes().len()));

    ctx.nested(|ctx| {
        for index in 0..count {
            if index == items.len() {
                items.push(T::default());
            }
            element(ctx, &mut items[index])?;
        }
        Ok(())
    })
}

/// 可被 [`map`] 编解码的关联容器。
///
/// 已为 [`HashMap`] 与 [`BTreeMap`] 实现。编码时条目顺序取决于容器的迭代顺序：
/// `HashMap` 未定义，`BTreeMap` 为键升序，需要逐字节稳定输出的调用方应选用后者。
pub trait MapLike<K, V> {
    /// 条目数。
    fn entry_count(&self) -> usize;

    /// 为即将插入的 `additional` 个条目预留空间。
    fn reserve_entries(&mut self, additional: usize);

    /// 插入或覆盖条目。
    fn insert_entry(&mut self, key: K, value: V);

    /// 依次访问每个条目，`f` 失败时立即返回该错误。
    fn try_for_each_entry<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&K, &mut V) -> Result<()>;
}

impl<K, V, S> MapLike<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn entry_count(&self) -> usize {
        self.len()
    }

    fn reserve_entries(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn try_for_each_entry<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&K, &mut V) -> Result<()>,
    {
        self.iter_mut().try_for_each(|(key, value)| f(key, value))
    }
}

impl<K, V> MapLike<K, V> for BTreeMap<K, V>
where
    K: Ord,
{
    fn entry_count(&self) -> usize {
        self.len()
    }

    // B 树按节点分配，没有预留接口。
    fn reserve_entries(&mut self, _additional: usize) {}

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn try_for_each_entry<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&K, &mut V) -> Result<()>,
    {
        self.iter_mut().try_for_each(|(key, value)| f(key, value))
    }
}

/// 编码或解码一个关联映射。
///
/// # 契约说明（What）
/// - 编码：写出条目数，再按容器迭代顺序写出 `(键, 值)` 对。键在容器内不可变，
///   因此先克隆到临时变量再交给 `key`；
/// - 解码：读出条目数并预留空间（不超过剩余字节数），之后对每个条目以默认值构造临时键值，依次调用 `key`/`value`，
///   两者都成功后插入（同键覆盖）。已有条目不会被清除；
/// - 任一函数失败时停止，已插入的条目保留，当前及之后的条目不会插入。
pub fn map<'a, D, M, K, V, FK, FV>(
    ctx: &mut Context<'a, D>,
    entries: &mut M,
    mut key: FK,
    mut value: FV,
) -> Result<()>
where
    D: Direction,
    M: MapLike<K, V>,
    K: Clone + Default,
    V: Default,
    FK: FnMut(&mut Context<'a, D>, &mut K) -> Result<()>,
    FV: FnMut(&mut Context<'a, D>, &mut V) -> Result<()>,
{
    let count = length(ctx, entries.entry_count())?;

    if ctx.is_encoding() {
        return ctx.nested(|ctx| {
            entries.try_for_each_entry(|k, v| {
                let mut k = k.clone();
                key(ctx, &mut k)?;
                value(ctx, v)
            })
        });
    }

    entries.reserve_entries(count.min(ctx.bytes().len()));
    ctx.nested(|ctx| {
        for _ in 0..count {
            let mut k = K::default();
            let mut v = V::default();
            key(ctx, &mut k)?;
            value(ctx, &mut v)?;
            entries.insert_entry(k, v);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Decoder, Encoder};
    use crate::error::CodecError;
    use crate::number::number;
    use crate::text::string;

    #[test]
    fn empty_sequence_is_eight_zero_bytes() {
        let mut ctx = Encoder::new();
        let mut items: Vec<u32> = Vec::new();
        seq(&mut ctx, &mut items, number).expect("encode");
        assert_eq!(ctx.bytes(), &[0u8; 8]);

        let wire = ctx.into_bytes();
        let mut dec = Decoder::new(&wire);
        let mut back = vec![7u32, 8];
        seq(&mut dec, &mut back, number).expect("decode");
        assert!(back.is_empty());
        assert_eq!(dec.error(), None);
    }

    #[test]
    fn sequence_layout_is_count_then_elements() {
        let mut ctx = Encoder::new();
        let mut items = vec![1u16, 2];
        seq(&mut ctx, &mut items, number).expect("encode");
        assert_eq!(ctx.bytes(), &[2, 0, 0, 0, 0, 0, 0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn decode_reuses_prefix_and_truncates_tail() {
        let mut ctx = Encoder::new();
        let mut items = vec![String::from("a"), String::from("b")];
        seq(&mut ctx, &mut items, string).expect("encode");
        let wire = ctx.into_bytes();

        let mut longer = vec![String::from("x"); 5];
        seq(&mut Decoder::new(&wire), &mut longer, string).expect("decode");
        assert_eq!(longer, items);
    }

    #[test]
    fn failed_element_stops_appending_positions() {
        // 声明 3 个 u32，但只给出 1 个半。
        let mut wire = vec![3, 0, 0, 0, 0, 0, 0, 0];
        wire.extend_from_slice(&42u32.to_le_bytes());
        wire.extend_from_slice(&[1, 2]);

        let mut ctx = Decoder::new(&wire);
        let mut items: Vec<u32> = Vec::new();
        let err = seq(&mut ctx, &mut items, number).expect_err("truncated");
        assert!(err.is_unexpected_end());
        assert_eq!(items, vec![42, 0]);
    }

    #[test]
    fn failed_element_keeps_prior_values_in_existing_positions() {
        // 声明 3 个 u32，只给出第一个；目标已有 3 个元素。
        let mut wire = vec![3, 0, 0, 0, 0, 0, 0, 0];
        wire.extend_from_slice(&42u32.to_le_bytes());

        let mut items = vec![7u32, 8, 9];
        let err = seq(&mut Decoder::new(&wire), &mut items, number).expect_err("truncated");
        assert!(err.is_unexpected_end());
        assert_eq!(items, vec![42, 8, 9]);
    }

    #[test]
    fn forged_count_poisons_without_reserving_it() {
        let wire = u64::from(u32::MAX).to_le_bytes();
        let mut ctx = Decoder::new(&wire);
        let mut items: Vec<u64> = Vec::new();
        let err = seq(&mut ctx, &mut items, number).expect_err("no elements present");
        assert_eq!(
            err,
            CodecError::UnexpectedEndOfBuffer {
                requested: 8,
                remaining: 0
            }
        );
        assert_eq!(items, vec![0]);
        assert!(items.capacity() < 16);
    }

    #[test]
    fn forged_map_count_poisons_without_reserving_it() {
        let wire = u64::from(u32::MAX).to_le_bytes();
        let mut entries: HashMap<u32, u32> = HashMap::new();
        let err = map(&mut Decoder::new(&wire), &mut entries, number, number)
            .expect_err("no entries present");
        assert!(err.is_unexpected_end());
        assert!(entries.is_empty());
        assert_eq!(entries.capacity(), 0);
    }

    #[test]
    fn element_codec_runs_no_further_after_failure() {
        let wire = [4, 0, 0, 0, 0, 0, 0, 0];
        let mut ctx = Decoder::new(&wire);
        let mut items: Vec<u8> = Vec::new();
        let mut calls = 0;
        let err = seq(&mut ctx, &mut items, |ctx, _item: &mut u8| {
            calls += 1;
            Err(ctx.poison(CodecError::custom("reject")))
        })
        .expect_err("element rejects");
        assert_eq!(err, CodecError::custom("reject"));
        assert_eq!(calls, 1);
        assert_eq!(items, vec![0]);
    }

    #[test]
    fn nested_sequences_round_trip() {
        let mut ctx = Encoder::new();
        let mut grid = vec![vec![1i32, -2], vec![], vec![3]];
        seq(&mut ctx, &mut grid, |ctx, row| seq(ctx, row, number)).expect("encode");
        let wire = ctx.into_bytes();

        let mut back: Vec<Vec<i32>> = Vec::new();
        seq(&mut Decoder::new(&wire), &mut back, |ctx, row| {
            seq(ctx, row, number)
        })
        .expect("decode");
        assert_eq!(back, grid);
    }

    #[test]
    fn hash_map_round_trips_as_a_set_of_pairs() {
        let mut entries: HashMap<String, i64> = HashMap::new();
        entries.insert("test1".into(), 1);
        entries.insert("test2".into(), 29_847_329);

        let mut ctx = Encoder::new();
        map(&mut ctx, &mut entries, string, number).expect("encode");
        let wire = ctx.into_bytes();

        let mut back: HashMap<String, i64> = HashMap::new();
        map(&mut Decoder::new(&wire), &mut back, string, number).expect("decode");
        assert_eq!(back, entries);
    }

    #[test]
    fn btree_map_emits_in_key_order() {
        let mut entries = BTreeMap::from([(2u8, 20u8), (1, 10)]);
        let mut ctx = Encoder::new();
        map(&mut ctx, &mut entries, number, number).expect("encode");
        assert_eq!(ctx.bytes(), &[2, 0, 0, 0, 0, 0, 0, 0, 1, 10, 2, 20]);
    }

    #[test]
    fn map_decode_overwrites_and_keeps_existing_entries() {
        let wire = [1, 0, 0, 0, 0, 0, 0, 0, 5, 50];
        let mut entries = BTreeMap::from([(5u8, 0u8), (6, 60)]);
        map(&mut Decoder::new(&wire), &mut entries, number, number).expect("decode");
        assert_eq!(entries, BTreeMap::from([(5, 50), (6, 60)]));
    }

    #[test]
    fn truncated_map_keeps_inserted_entries() {
        // 两个条目，第二个值缺失。
        let wire = [2, 0, 0, 0, 0, 0, 0, 0, 1, 10, 2];
        let mut entries: BTreeMap<u8, u8> = BTreeMap::new();
        let err = map(&mut Decoder::new(&wire), &mut entries, number, number)
            .expect_err("second value missing");
        assert!(err.is_unexpected_end());
        assert_eq!(entries, BTreeMap::from([(1, 10)]));
    }
}
