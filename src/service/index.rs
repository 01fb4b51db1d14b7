use crate::models::{Candidate, Listing};
use crate::service::Tokenizer;
use rayon::prelude::*;
use std::collections::HashMap;

/// 倒排索引：词 -> 包含该词的候选位置 (按插入顺序)
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<usize>>,
}

impl InvertedIndex {
    /// 每个候选的词集合已去重，同一候选在一个倒排表中最多出现一次
    pub fn build(candidates: &[Candidate]) -> Self {
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, candidate) in candidates.iter().enumerate() {
            for token in &candidate.tokens {
                postings.entry(token.clone()).or_default().push(pos);
            }
        }
        Self { postings }
    }

    pub fn postings(&self, token: &str) -> &[usize] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }
}

/// 一个价格来源：候选列表 + 倒排索引，构建后只读
#[derive(Debug, Clone)]
pub struct SourceIndex {
    id: String,
    candidates: Vec<Candidate>,
    index: InvertedIndex,
}

impl SourceIndex {
    pub fn new(id: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        let index = InvertedIndex::build(&candidates);
        Self {
            id: id.into(),
            candidates,
            index,
        }
    }

    /// 并行规范化 / 分词，无效条目 (空标题、非正价格) 被丢弃
    pub fn from_listings(id: impl Into<String>, listings: &[Listing], tokenizer: &Tokenizer) -> Self {
        let id = id.into();
        let candidates: Vec<Candidate> = listings
            .par_iter()
            .filter_map(|listing| Candidate::from_listing(listing, tokenizer))
            .collect();

        let dropped = listings.len() - candidates.len();
        if dropped > 0 {
            tracing::warn!("Source {}: dropped {} listings without title or price", id, dropped);
        }

        let source = Self::new(id, candidates);
        tracing::info!(
            "Source {}: indexed {} candidates, {} distinct tokens",
            source.id,
            source.candidates.len(),
            source.index.token_count()
        );
        source
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, pos: usize) -> Option<&Candidate> {
        self.candidates.get(pos)
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
