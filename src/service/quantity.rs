//! 规格提取与单位换算
//!
//! 从原始标题 (未规范化) 中解析重量、容量、件数，
//! 判断来源商品能否按目标单位计价，并把包装价换算成单位价。

use crate::models::{BaseUnit, Candidate, TargetUnit};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_MASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(кг|г|гр)\b").expect("valid mass regex")
});

static RE_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(л|мл)\b").expect("valid volume regex")
});

static RE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(шт|pcs)\b").expect("valid count regex")
});

/// 标题中的规格汇总，同类多次出现时累加
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quantities {
    mass_kg: f64,
    volume_l: f64,
    pieces: f64,
}

impl Quantities {
    pub fn mass_kg(&self) -> Option<f64> {
        positive(self.mass_kg)
    }

    pub fn volume_l(&self) -> Option<f64> {
        positive(self.volume_l)
    }

    pub fn pieces(&self) -> Option<f64> {
        positive(self.pieces)
    }

    pub fn is_empty(&self) -> bool {
        self.mass_kg().is_none() && self.volume_l().is_none() && self.pieces().is_none()
    }
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn captured_number(caps: &Captures<'_>) -> Option<f64> {
    caps.get(1)?.as_str().replace(',', ".").parse().ok()
}

/// 解析标题中的重量 (kg)、容量 (l)、件数
pub fn extract_quantities(title: &str) -> Quantities {
    let text = title.to_lowercase();
    let mut out = Quantities::default();

    for caps in RE_MASS.captures_iter(&text) {
        let Some(num) = captured_number(&caps) else { continue };
        out.mass_kg += if &caps[2] == "кг" { num } else { num / 1000.0 };
    }

    for caps in RE_VOLUME.captures_iter(&text) {
        let Some(num) = captured_number(&caps) else { continue };
        out.volume_l += if &caps[2] == "л" { num } else { num / 1000.0 };
    }

    for caps in RE_COUNT.captures_iter(&text) {
        let Some(num) = captured_number(&caps) else { continue };
        out.pieces += num;
    }

    out
}

/// 单位兼容性判断 (只依赖参数，没有隐藏状态)
///
/// 没有明确规格时，称重商品默认已经是每千克价格。
pub fn unit_compatible(
    target: TargetUnit,
    base_unit: Option<BaseUnit>,
    has_explicit_quantity: bool,
    quantities: &Quantities,
) -> bool {
    match target {
        TargetUnit::Kg => {
            if has_explicit_quantity {
                quantities.mass_kg().is_some()
            } else {
                matches!(base_unit, None | Some(BaseUnit::Mass))
            }
        }
        TargetUnit::Liters | TargetUnit::Milliliters => {
            if base_unit == Some(BaseUnit::Pieces) {
                return false;
            }
            if has_explicit_quantity {
                quantities.volume_l().is_some()
            } else {
                base_unit == Some(BaseUnit::Volume)
            }
        }
        TargetUnit::Pieces => match base_unit {
            Some(BaseUnit::Pieces) => true,
            Some(BaseUnit::Volume) => false,
            _ => has_explicit_quantity && quantities.pieces().is_some(),
        },
        TargetUnit::Grams | TargetUnit::Unspecified => true,
    }
}

pub fn is_unit_compatible(target: TargetUnit, candidate: &Candidate) -> bool {
    unit_compatible(
        target,
        candidate.base_unit,
        candidate.has_explicit_quantity,
        &candidate.quantities,
    )
}

/// 把来源价格换算到目标单位；缺少对应规格时返回 None
pub fn convert_price(target: TargetUnit, candidate: &Candidate) -> Option<f64> {
    let qs = &candidate.quantities;
    match target {
        TargetUnit::Kg => qs.mass_kg().map(|kg| candidate.price / kg),
        TargetUnit::Liters => qs.volume_l().map(|l| candidate.price / l),
        TargetUnit::Milliliters => qs.volume_l().map(|l| candidate.price / (l * 1000.0)),
        TargetUnit::Pieces => qs.pieces().map(|n| candidate.price / n),
        TargetUnit::Grams | TargetUnit::Unspecified => Some(candidate.price),
    }
}
