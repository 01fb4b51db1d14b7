use crate::models::TargetUnit;
use serde::{Deserialize, Serialize};

/// 目标目录中需要刷新价格的商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// 在目标目录数组中的位置
    pub position: usize,
    pub title: String,
    pub price: Option<f64>,
    pub unit: TargetUnit,
    /// 标题缺失或不是字符串时，报告中显示的原值
    #[serde(default)]
    pub label: Option<String>,
}

impl Query {
    pub fn new(position: usize, title: impl Into<String>, price: Option<f64>, unit: TargetUnit) -> Self {
        Self {
            position,
            title: title.into(),
            price,
            unit,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 报告中展示的标题
    pub fn display_title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_takes_precedence_in_display() {
        let plain = Query::new(0, "Цукор", None, TargetUnit::Kg);
        assert_eq!(plain.display_title(), "Цукор");

        let untitled = Query::new(1, "", None, TargetUnit::Unspecified).with_label("null");
        assert_eq!(untitled.title, "");
        assert_eq!(untitled.display_title(), "null");
    }
}
