use crate::config::SourceConfig;
use crate::error::{ReconError, Result};
use crate::models::{Listing, PriceChange, Query, TargetUnit};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 读取并解析 JSON 文件
pub async fn read_json(path: &Path) -> Result<Value> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReconError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// 读取一个价格来源的全部报价
pub async fn load_listings(source: &SourceConfig) -> Result<Vec<Listing>> {
    let doc = read_json(&source.path).await?;
    let listings = listings_from_json(&doc, source)?;
    tracing::info!(
        "Source {}: loaded {} listings from {}",
        source.id,
        listings.len(),
        source.path.display()
    );
    Ok(listings)
}

/// 按字段映射提取报价；缺标题或价格不是数字的条目被跳过
pub fn listings_from_json(doc: &Value, source: &SourceConfig) -> Result<Vec<Listing>> {
    let items = match source.items_pointer.as_deref() {
        Some(pointer) => doc.pointer(pointer),
        None => Some(doc),
    };
    let Some(items) = items.and_then(Value::as_array) else {
        return Err(ReconError::Catalog {
            path: source.path.clone(),
            reason: format!(
                "expected an array at {}",
                source.items_pointer.as_deref().unwrap_or("document root")
            ),
        });
    };

    let mut skipped = 0usize;
    let mut listings = Vec::with_capacity(items.len());
    for item in items {
        let title = source
            .title_keys
            .iter()
            .filter_map(|key| item.get(key).and_then(Value::as_str))
            .find(|t| !t.trim().is_empty());
        let price = item.get(&source.price_key).and_then(Value::as_f64);

        let (Some(title), Some(price)) = (title, price) else {
            skipped += 1;
            continue;
        };

        let base_unit = source
            .base_unit_key
            .as_deref()
            .and_then(|key| item.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        listings.push(Listing {
            title: title.to_string(),
            price,
            base_unit,
        });
    }

    if skipped > 0 {
        tracing::warn!("Source {}: {} items without title or numeric price", source.id, skipped);
    }
    Ok(listings)
}

/// 目标商品目录
///
/// 保留原始 JSON，回写时只修改 `price` 字段。
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    path: PathBuf,
    document: Vec<Value>,
}

impl ProductCatalog {
    pub async fn load(path: &Path) -> Result<Self> {
        let doc = read_json(path).await?;
        Self::from_json(path, doc)
    }

    pub fn from_json(path: &Path, doc: Value) -> Result<Self> {
        let Value::Array(document) = doc else {
            return Err(ReconError::Catalog {
                path: path.to_path_buf(),
                reason: "expected a JSON array of products".to_string(),
            });
        };
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// 每个条目对应一个 Query；非字符串标题记为空标题 (随后被跳过)，原值留作报告标签
    pub fn queries(&self) -> Vec<Query> {
        self.document
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let price = item.get("price").and_then(Value::as_f64);
                let unit = item
                    .get("unit")
                    .and_then(Value::as_str)
                    .map(TargetUnit::parse)
                    .unwrap_or_default();
                match item.get("title") {
                    Some(Value::String(title)) => Query::new(position, title.as_str(), price, unit),
                    Some(other) => Query::new(position, "", price, unit).with_label(other.to_string()),
                    None => Query::new(position, "", price, unit).with_label("<missing title>"),
                }
            })
            .collect()
    }

    pub fn apply(&mut self, changes: &[PriceChange]) {
        for change in changes {
            if let Some(Value::Object(item)) = self.document.get_mut(change.position) {
                item.insert("price".to_string(), Value::from(change.new_price));
            }
        }
    }

    pub fn price(&self, position: usize) -> Option<f64> {
        self.document.get(position)?.get("price")?.as_f64()
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.document)?;
        out.push('\n');
        Ok(out)
    }

    /// 覆盖写回原文件
    pub async fn save(&self) -> Result<()> {
        let content = self.to_json_string()?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| ReconError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
