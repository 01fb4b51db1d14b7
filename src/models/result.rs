use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 单次匹配结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    /// 命中的候选在来源目录中的位置
    pub candidate: Option<usize>,
    pub score: f64,
    pub source: &'a str,
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        self.candidate.is_some()
    }
}

/// 价格变更记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub position: usize,
    pub title: String,
    pub old_price: Option<f64>,
    pub new_price: f64,
    pub source: String,
    pub score: f64,
}

/// 对账汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub total: usize,
    /// 来源 -> 更新条数，按来源优先级排列
    pub updated_by_source: IndexMap<String, usize>,
    pub skipped: usize,
    pub skipped_titles: Vec<String>,
    pub changes: Vec<PriceChange>,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn updated(&self, source: &str) -> usize {
        self.updated_by_source.get(source).copied().unwrap_or(0)
    }

    pub fn total_updated(&self) -> usize {
        self.updated_by_source.values().sum()
    }
}
