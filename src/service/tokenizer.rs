//! 分词与轻量词干提取
//!
//! 词干规则是启发式的：按顺序匹配后缀表，第一个命中的后缀被去掉，
//! 前提是剩余部分至少 3 个字符。不做真正的形态分析。

use indexmap::IndexSet;
use std::collections::HashSet;

/// 停用词与后缀表 (静态配置数据)
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub stopwords: &'static [&'static str],
    pub suffixes: &'static [&'static str],
    /// 不超过该长度的词不做词干处理
    pub max_unstemmed_len: usize,
    /// 去掉后缀后至少保留的字符数
    pub min_stem_len: usize,
}

/// 乌克兰语连词 / 介词与常见屈折词尾
pub const UKRAINIAN: Lexicon = Lexicon {
    stopwords: &[
        "і", "й", "та", "з", "із", "зі", "в", "у", "на", "для", "по", "без", "до", "від", "про",
        "або",
    ],
    suffixes: &[
        "ими", "ами", "ями", "ого", "ому", "ий", "ій", "ою", "ею", "ая", "яя", "ое", "є", "е", "а",
        "я", "и", "і", "у", "ю", "о",
    ],
    max_unstemmed_len: 4,
    min_stem_len: 3,
};

#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<&'static str>,
    suffixes: &'static [&'static str],
    max_unstemmed_len: usize,
    min_stem_len: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&UKRAINIAN)
    }
}

impl Tokenizer {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            stopwords: lexicon.stopwords.iter().copied().collect(),
            suffixes: lexicon.suffixes,
            max_unstemmed_len: lexicon.max_unstemmed_len,
            min_stem_len: lexicon.min_stem_len,
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// 对规范化后的文本分词，保持原有顺序
    pub fn tokenize(&self, normalized: &str) -> Vec<String> {
        normalized
            .split(' ')
            .filter(|t| !t.is_empty() && !self.is_stopword(t))
            .map(|t| self.stem(t))
            .filter(|t| !t.is_empty() && !self.is_stopword(t))
            .collect()
    }

    /// 去重后的词集合 (保留首次出现顺序)
    pub fn token_set(&self, normalized: &str) -> IndexSet<String> {
        self.tokenize(normalized).into_iter().collect()
    }

    pub fn stem(&self, token: &str) -> String {
        let token = token.trim_matches('\'');
        let len = token.chars().count();
        if len <= self.max_unstemmed_len {
            return token.to_string();
        }

        for suffix in self.suffixes {
            if token.ends_with(suffix) && len - suffix.chars().count() >= self.min_stem_len {
                return token[..token.len() - suffix.len()].to_string();
            }
        }
        token.to_string()
    }
}
