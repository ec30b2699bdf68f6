//! 集成测试共享的记录类型。
//!
//! - `Stamp`：自带二进制表示的时间戳，经 [`external`] 委托编解码；
//! - `Contact`/`Profile`：覆盖数值、字符串、字节、嵌套序列、映射与外部能力的多层记录。
#![allow(dead_code)]

use std::collections::BTreeMap;

use spark_codec_binary::{
    BinaryMarshal, Context, Direction, Result, Schema, external, map, number, schema, seq, string,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StampError {
    #[error("stamp payload must be 12 bytes, got {0}")]
    Length(usize),
    #[error("nanoseconds out of range: {0}")]
    Nanos(u32),
}

/// 秒 + 纳秒，负载为 12 字节大端。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stamp {
    pub secs: i64,
    pub nanos: u32,
}

impl BinaryMarshal for Stamp {
    type Error = StampError;

    fn marshal_binary(&self) -> Result<Vec<u8>, StampError> {
        if self.nanos >= 1_000_000_000 {
            return Err(StampError::Nanos(self.nanos));
        }
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&self.secs.to_be_bytes());
        out.extend_from_slice(&self.nanos.to_be_bytes());
        Ok(out)
    }

    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), StampError> {
        let payload: [u8; 12] = data
            .try_into()
            .map_err(|_| StampError::Length(data.len()))?;
        let (secs, nanos) = payload.split_at(8);
        let secs = i64::from_be_bytes(secs.try_into().map_err(|_| StampError::Length(12))?);
        let nanos = u32::from_be_bytes(nanos.try_into().map_err(|_| StampError::Length(12))?);
        if nanos >= 1_000_000_000 {
            return Err(StampError::Nanos(nanos));
        }
        self.secs = secs;
        self.nanos = nanos;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contact {
    pub kind: u8,
    pub address: String,
}

impl Schema for Contact {
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()> {
        number(ctx, &mut value.kind)?;
        string(ctx, &mut value.address)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub score: f64,
    pub delta: i32,
    pub avatar: Vec<u8>,
    pub contacts: Vec<Contact>,
    pub matrix: Vec<Vec<i16>>,
    pub counters: BTreeMap<String, i64>,
    pub joined: Stamp,
}

impl Schema for Profile {
    fn codec<D: Direction>(ctx: &mut Context<'_, D>, value: &mut Self) -> Result<()> {
        number(ctx, &mut value.id)?;
        string(ctx, &mut value.name)?;
        number(ctx, &mut value.score)?;
        number(ctx, &mut value.delta)?;
        spark_codec_binary::bytes(ctx, &mut value.avatar)?;
        seq(ctx, &mut value.contacts, schema)?;
        seq(ctx, &mut value.matrix, |ctx, row| seq(ctx, row, number))?;
        map(ctx, &mut value.counters, string, number)?;
        external(ctx, &mut value.joined)
    }
}

pub fn sample_profile() -> Profile {
    Profile {
        id: 42,
        name: "Ada Lovelace".into(),
        score: 98.25,
        delta: -17,
        avatar: vec![0x89, b'P', b'N', b'G'],
        contacts: vec![
            Contact {
                kind: 1,
                address: "ada@example.org".into(),
            },
            Contact {
                kind: 2,
                address: "+44 20 7946 0000".into(),
            },
        ],
        matrix: vec![vec![1, -2, 3], vec![], vec![i16::MIN, i16::MAX]],
        counters: BTreeMap::from([("logins".into(), 1), ("posts".into(), 29_847_329)]),
        joined: Stamp {
            secs: 1_700_000_000,
            nanos: 123_456_789,
        },
    }
}
