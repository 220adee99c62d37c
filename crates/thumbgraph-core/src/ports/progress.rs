//! ProgressReporter port - 進捗の通知
//!
//! 表示形式はコアの契約外。開始・1 件ごとの前進・完了の 3 点だけを通知します。

use crate::domain::{ItemOutcome, RunReport};

pub trait ProgressReporter: Send + Sync {
    fn start(&self, total: usize);

    fn tick(&self, outcome: &ItemOutcome);

    fn finish(&self, report: &RunReport);
}
