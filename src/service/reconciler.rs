use crate::models::{Candidate, MatchResult, PriceChange, Query, ReconcileReport, TargetUnit};
use crate::service::{convert_price, MatcherService, SourceIndex};
use chrono::Utc;
use dashmap::DashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 新旧价格差异小于该值视为未变化
pub const PRICE_EPSILON: f64 = 1e-9;

/// 单个商品的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Changed(PriceChange),
    /// 匹配成功但价格未变化
    Unchanged { source: String },
    Skipped,
}

/// 对账服务：按来源优先级为每个目标商品查找价格
pub struct ReconcileService {
    matcher: MatcherService,
    convert_packs: bool,
}

impl ReconcileService {
    pub fn new(matcher: MatcherService, convert_packs: bool) -> Self {
        Self {
            matcher,
            convert_packs,
        }
    }

    pub fn matcher(&self) -> &MatcherService {
        &self.matcher
    }

    /// 依次查询各来源，返回第一个可信的匹配
    pub fn resolve<'a>(&self, query: &Query, sources: &'a [SourceIndex]) -> Option<(MatchResult<'a>, &'a Candidate)> {
        sources.iter().find_map(|source| {
            let result = self.matcher.find_best(&query.title, query.unit, source);
            let candidate = source.candidate(result.candidate?)?;
            Some((result, candidate))
        })
    }

    /// 只有开启包装换算且标题带规格时才换算，换算失败时沿用原价
    pub fn new_price(&self, unit: TargetUnit, candidate: &Candidate) -> f64 {
        if self.convert_packs && candidate.has_explicit_quantity {
            if let Some(converted) = convert_price(unit, candidate) {
                return converted;
            }
        }
        candidate.price
    }

    pub fn resolve_outcome(&self, query: &Query, sources: &[SourceIndex]) -> Outcome {
        if query.title.trim().is_empty() {
            return Outcome::Skipped;
        }
        let Some((result, candidate)) = self.resolve(query, sources) else {
            return Outcome::Skipped;
        };

        let new_price = self.new_price(query.unit, candidate);
        let changed = match query.price {
            Some(old) => (new_price - old).abs() > PRICE_EPSILON,
            None => true,
        };
        if !changed {
            return Outcome::Unchanged {
                source: result.source.to_string(),
            };
        }

        tracing::debug!(
            "[{} score={:.3}] {} <- {}",
            result.source,
            result.score,
            query.title,
            candidate.raw_title
        );
        Outcome::Changed(PriceChange {
            position: query.position,
            title: query.title.clone(),
            old_price: query.price,
            new_price,
            source: result.source.to_string(),
            score: result.score,
        })
    }

    /// 并行匹配全部商品，结束后统一回写价格
    pub fn reconcile(&self, queries: &mut [Query], sources: &[SourceIndex]) -> ReconcileReport {
        let total = queries.len();
        let updated: DashMap<String, usize> = DashMap::new();
        let processed = AtomicUsize::new(0);
        let changed = AtomicUsize::new(0);

        tracing::info!("开始对账: {} 个商品, {} 个价格来源", total, sources.len());

        let outcomes: Vec<Outcome> = queries
            .par_iter()
            .map(|query| {
                let outcome = self.resolve_outcome(query, sources);
                if let Outcome::Changed(change) = &outcome {
                    *updated.entry(change.source.clone()).or_insert(0) += 1;
                    changed.fetch_add(1, Ordering::Relaxed);
                }

                let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if current % 100 == 0 || current == 1 {
                    tracing::info!("对账进度: {}/{}, 已更新: {}", current, total, changed.load(Ordering::Relaxed));
                }
                outcome
            })
            .collect();

        let mut changes = Vec::new();
        let mut skipped_titles = Vec::new();
        for (query, outcome) in queries.iter_mut().zip(outcomes) {
            match outcome {
                Outcome::Changed(change) => {
                    query.price = Some(change.new_price);
                    changes.push(change);
                }
                Outcome::Unchanged { .. } => {}
                Outcome::Skipped => skipped_titles.push(query.display_title().to_string()),
            }
        }

        let updated_by_source: IndexMap<String, usize> = sources
            .iter()
            .map(|s| {
                let count = updated.get(s.id()).map(|c| *c).unwrap_or(0);
                (s.id().to_string(), count)
            })
            .collect();

        let report = ReconcileReport {
            total,
            updated_by_source,
            skipped: skipped_titles.len(),
            skipped_titles,
            changes,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "对账完成: 商品 {}, 更新 {}, 跳过 {}",
            report.total,
            report.total_updated(),
            report.skipped
        );
        report
    }
}
