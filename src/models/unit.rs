use serde::{Deserialize, Serialize};

/// 来源商品声明的基础单位 (例如 ATB 的 `baseUnit`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseUnit {
    /// G / KG
    Mass,
    /// ML / L
    Volume,
    /// PCS
    Pieces,
    /// 声明了但无法识别
    Unrecognized,
}

impl BaseUnit {
    /// 空白字符串视为未声明
    pub fn parse(raw: &str) -> Option<Self> {
        let unit = raw.trim();
        if unit.is_empty() {
            return None;
        }
        Some(match unit.to_uppercase().as_str() {
            "G" | "KG" => Self::Mass,
            "ML" | "L" => Self::Volume,
            "PCS" => Self::Pieces,
            _ => Self::Unrecognized,
        })
    }
}

/// 目标商品的计价单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetUnit {
    /// 每千克价格
    Kg,
    /// 通用克重，没有可靠的换算规则
    Grams,
    /// 每升价格
    Liters,
    /// 每毫升价格
    Milliliters,
    /// 每件价格
    Pieces,
    #[default]
    Unspecified,
}

impl TargetUnit {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "KG" => Self::Kg,
            "G" => Self::Grams,
            "L" => Self::Liters,
            "ML" => Self::Milliliters,
            "PCS" => Self::Pieces,
            _ => Self::Unspecified,
        }
    }
}
