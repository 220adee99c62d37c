//! IdGenerator port - 生成物 ID の採番
//!
//! サムネイルの File ノード ID はこのクレートが採番します。
//! ULID なので時刻でソート可能、かつ複数プロセスで衝突しません。

use crate::domain::ids::FileId;
use crate::ports::Clock;
use ulid::Ulid;

pub trait IdGenerator: Send + Sync {
    fn generate_file_id(&self) -> FileId;
}

/// UlidGenerator は Clock の時刻を timestamp 部分に使う ULID 生成器
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_file_id(&self) -> FileId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        FileId::from_ulid(ulid)
    }
}
