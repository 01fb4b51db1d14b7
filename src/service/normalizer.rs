//! 标题规范化
//!
//! 把原始标题转换成可比较的小写文本：去掉包装规格、百分比和数字，
//! 只保留拉丁/西里尔字母、撇号和单个空格。纯函数，对任何输入都有结果。

use regex::Regex;
use std::sync::LazyLock;

/// 数字后紧跟的重量 / 容量 / 件数单位，例如 `950г`、`1,5 л`、`8шт`
static RE_UNIT_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:[.,]\d+)?\s*(?:кг|г|гр|л|мл|шт|pcs)\b").expect("valid unit regex")
});

static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\s*%").expect("valid percent regex"));

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").expect("valid number regex"));

static RE_NON_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-zа-яіїєґ'\s]").expect("valid letter regex"));

/// 视为撇号的字形
const APOSTROPHES: &[char] = &['`', '\u{2019}', '\u{02BC}'];

/// 规范化标题
pub fn normalize(title: &str) -> String {
    let lowered = title.to_lowercase().replace(APOSTROPHES, "'");

    let text = RE_UNIT_ANNOTATION.replace_all(&lowered, " ");
    let text = RE_PERCENT.replace_all(&text, " ");
    let text = RE_NUMBER.replace_all(&text, " ");
    let text = RE_NON_LETTER.replace_all(&text, " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 标题中是否带有明确的规格 (通常意味着是包装价)
pub fn has_explicit_quantity(title: &str) -> bool {
    RE_UNIT_ANNOTATION.is_match(&title.to_lowercase())
}
