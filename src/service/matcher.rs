use crate::config::MatchConfig;
use crate::error::Result;
use crate::models::{MatchResult, TargetUnit};
use crate::service::{is_unit_compatible, normalize, score_with_tokens, SourceIndex, Tokenizer};
use indexmap::{IndexMap, IndexSet};

/// 单词标题的最低分 (与配置的 min_score 取较大者)
pub const SINGLE_TOKEN_MIN_SCORE: f64 = 0.88;

/// 词数达到该值时至少要求 2 个重合词
const LONG_QUERY_TOKENS: usize = 3;

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 标题分词后为空
    NoTokens,
    /// 没有候选满足重合词要求
    NoCandidates,
    /// 单词标题：最佳候选不包含该词
    SingleTokenMissing,
    /// 单词标题：未达到更严格的分数线
    SingleTokenBelowFloor,
    BelowMinScore,
    UnitIncompatible,
    /// 第一名与第二名分差过小
    Ambiguous,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Accepted { candidate: usize, score: f64 },
    Rejected { reason: Rejection, score: f64 },
}

impl Decision {
    pub fn score(&self) -> f64 {
        match *self {
            Self::Accepted { score, .. } | Self::Rejected { score, .. } => score,
        }
    }
}

/// 排名：最佳候选、最高分、次高分
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ranking {
    pub best: Option<usize>,
    pub best_score: f64,
    pub runner_up: f64,
}

impl Ranking {
    /// 严格大于才替换，分数相同时先出现的候选保持第一
    pub fn push(&mut self, pos: usize, score: f64) {
        if score > self.best_score {
            self.runner_up = self.best_score;
            self.best_score = score;
            self.best = Some(pos);
        } else if score > self.runner_up {
            self.runner_up = score;
        }
    }
}

/// 歧义保护：两个几乎同样好的候选不能被静默择一
pub fn passes_ambiguity_guard(best_score: f64, runner_up: f64, min_score_gap: f64) -> bool {
    best_score - runner_up >= min_score_gap
}

/// 长标题要求至少 2 个重合词，单词标题至少 1 个
pub fn effective_min_overlap(configured: usize, query_tokens: usize) -> usize {
    if query_tokens >= LONG_QUERY_TOKENS {
        configured.max(2)
    } else if query_tokens == 1 {
        configured.max(1)
    } else {
        configured
    }
}

/// 标题匹配服务，除只读索引外不保留任何状态
#[derive(Debug, Clone)]
pub struct MatcherService {
    tokenizer: Tokenizer,
    config: MatchConfig,
}

impl MatcherService {
    pub fn new(config: MatchConfig) -> Result<Self> {
        Self::with_tokenizer(config, Tokenizer::default())
    }

    pub fn with_tokenizer(config: MatchConfig, tokenizer: Tokenizer) -> Result<Self> {
        config.validate()?;
        Ok(Self { tokenizer, config })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// 在一个来源中查找最佳候选
    pub fn find_best<'a>(&self, title: &str, unit: TargetUnit, source: &'a SourceIndex) -> MatchResult<'a> {
        let decision = self.decide(title, unit, source);
        match decision {
            Decision::Accepted { candidate, score } => MatchResult {
                candidate: Some(candidate),
                score,
                source: source.id(),
            },
            Decision::Rejected { reason, score } => {
                tracing::debug!(
                    "[{}] no confident match for {:?}: {:?} (score {:.3})",
                    source.id(),
                    title,
                    reason,
                    score
                );
                MatchResult {
                    candidate: None,
                    score,
                    source: source.id(),
                }
            }
        }
    }

    /// 检索、打分、逐条应用保护规则
    pub fn decide(&self, title: &str, unit: TargetUnit, source: &SourceIndex) -> Decision {
        let q_norm = normalize(title);
        let q_tokens = self.tokenizer.token_set(&q_norm);
        if q_tokens.is_empty() {
            return Decision::Rejected {
                reason: Rejection::NoTokens,
                score: 0.0,
            };
        }

        let min_overlap = effective_min_overlap(self.config.min_token_overlap, q_tokens.len());
        let shortlist = self.shortlist(&q_tokens, source, min_overlap);
        if shortlist.is_empty() {
            return Decision::Rejected {
                reason: Rejection::NoCandidates,
                score: 0.0,
            };
        }

        // 按重合词数排序后的候选逐一打分
        let mut ranking = Ranking::default();
        for pos in shortlist {
            let Some(c) = source.candidate(pos) else { continue };
            let sc = score_with_tokens(&q_norm, &q_tokens, &c.normalized_title, &c.tokens);
            ranking.push(pos, sc);
        }

        let score = ranking.best_score;
        let reject = |reason| Decision::Rejected { reason, score };
        let Some((best_pos, best)) = ranking.best.and_then(|pos| Some((pos, source.candidate(pos)?))) else {
            return reject(Rejection::NoCandidates);
        };

        // 单词标题 (如 "хліб") 极易误配，要求候选包含同一个词且分数更高
        if q_tokens.len() == 1 {
            if !q_tokens.iter().all(|t| best.tokens.contains(t)) {
                return reject(Rejection::SingleTokenMissing);
            }
            if score < self.config.min_score.max(SINGLE_TOKEN_MIN_SCORE) {
                return reject(Rejection::SingleTokenBelowFloor);
            }
        }

        if score < self.config.min_score {
            return reject(Rejection::BelowMinScore);
        }
        if !is_unit_compatible(unit, best) {
            return reject(Rejection::UnitIncompatible);
        }
        if !passes_ambiguity_guard(score, ranking.runner_up, self.config.min_score_gap) {
            return reject(Rejection::Ambiguous);
        }

        Decision::Accepted {
            candidate: best_pos,
            score,
        }
    }

    /// 通过倒排索引收集候选，统计重合词数，保留前 max_candidates 个
    fn shortlist(&self, q_tokens: &IndexSet<String>, source: &SourceIndex, min_overlap: usize) -> Vec<usize> {
        let mut overlap: IndexMap<usize, usize> = IndexMap::new();
        for token in q_tokens {
            for &pos in source.index().postings(token) {
                *overlap.entry(pos).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(usize, usize)> = overlap
            .into_iter()
            .filter(|&(_, count)| count >= min_overlap)
            .collect();
        // 稳定排序，重合数相同的保持首次出现顺序
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.config.max_candidates);
        ranked.into_iter().map(|(pos, _)| pos).collect()
    }
}
