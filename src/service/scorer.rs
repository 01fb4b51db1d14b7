use crate::service::Tokenizer;
use indexmap::IndexSet;

/// 词重合权重，字符序列相似度占其余部分
pub const TOKEN_WEIGHT: f64 = 0.65;
pub const SEQUENCE_WEIGHT: f64 = 0.35;

/// 两个规范化标题的相似度，取值 [0, 1]
pub fn score(tokenizer: &Tokenizer, a_norm: &str, b_norm: &str) -> f64 {
    if a_norm.is_empty() || b_norm.is_empty() {
        return 0.0;
    }
    let a_tokens = tokenizer.token_set(a_norm);
    let b_tokens = tokenizer.token_set(b_norm);
    score_with_tokens(a_norm, &a_tokens, b_norm, &b_tokens)
}

/// 使用预先计算好的词集合打分 (候选商品的词集合在建索引时已缓存)
pub fn score_with_tokens(
    a_norm: &str,
    a_tokens: &IndexSet<String>,
    b_norm: &str,
    b_tokens: &IndexSet<String>,
) -> f64 {
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }
    TOKEN_WEIGHT * jaccard(a_tokens, b_tokens) + SEQUENCE_WEIGHT * sequence_ratio(a_norm, b_norm)
}

pub fn jaccard(a: &IndexSet<String>, b: &IndexSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// 基于最长公共子序列的字符相似度: 2 * LCS / (|a| + |b|)
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_length(&a, &b) as f64 / total as f64
}

/// 两行滚动 DP
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
