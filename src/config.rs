use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 默认配置文件 (存在时自动加载)
pub const DEFAULT_CONFIG_FILE: &str = "price-recon.toml";

/// 环境变量前缀，例如 `PRICE_RECON_MATCHING__MIN_SCORE=0.7`
pub const ENV_PREFIX: &str = "PRICE_RECON";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub reconcile: ReconcileConfig,
    /// 目标商品目录 (需要刷新价格的 JSON 数组)
    pub products: PathBuf,
    /// 价格来源，按优先级排列
    pub sources: Vec<SourceConfig>,
    pub report: ReportConfig,
}

/// 匹配阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub min_score: f64,
    pub min_token_overlap: usize,
    pub min_score_gap: f64,
    /// 按重合词数保留的候选上限
    pub max_candidates: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// 把包装价 (950г / 1л / 8шт) 换算成目标单位价
    pub convert_packs: bool,
}

/// 单个价格来源的字段映射
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub path: PathBuf,
    /// 商品数组所在的 JSON Pointer，缺省为根节点
    #[serde(default)]
    pub items_pointer: Option<String>,
    /// 标题字段，取第一个非空值
    pub title_keys: Vec<String>,
    #[serde(default = "default_price_key")]
    pub price_key: String,
    #[serde(default)]
    pub base_unit_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    Changed,
    Skipped,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub mode: ReportMode,
    /// 变更明细 CSV 导出路径
    pub csv: Option<PathBuf>,
}

/// 命令行覆盖项，优先级高于配置文件和环境变量
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub products: Option<PathBuf>,
    /// `ID=PATH`，ID 不区分大小写
    pub sources: Vec<String>,
    pub min_score: Option<f64>,
    pub min_token_overlap: Option<usize>,
    pub min_score_gap: Option<f64>,
    pub convert_packs: bool,
    pub report: Option<ReportMode>,
    pub csv: Option<PathBuf>,
}

fn default_price_key() -> String {
    "price".to_string()
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: 0.62,
            min_token_overlap: 1,
            min_score_gap: 0.06,
            max_candidates: 200,
        }
    }
}

impl MatchConfig {
    /// 构造并立即校验
    pub fn new(min_score: f64, min_token_overlap: usize, min_score_gap: f64) -> Result<Self> {
        let config = Self {
            min_score,
            min_token_overlap,
            min_score_gap,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("min_score", self.min_score)?;
        check_unit_interval("min_score_gap", self.min_score_gap)?;
        if self.max_candidates == 0 {
            return Err(ReconError::InvalidThreshold {
                name: "max_candidates",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ReconError::InvalidThreshold { name, value })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            reconcile: ReconcileConfig::default(),
            products: PathBuf::from("product_data.json"),
            sources: vec![
                SourceConfig {
                    id: "ATB".to_string(),
                    path: PathBuf::from("atb_products.json"),
                    items_pointer: Some("/products".to_string()),
                    title_keys: vec!["name".to_string(), "originalTitle".to_string()],
                    price_key: default_price_key(),
                    base_unit_key: Some("baseUnit".to_string()),
                },
                SourceConfig {
                    id: "METRO".to_string(),
                    path: PathBuf::from("metro_full_catalog_all_pages.json"),
                    items_pointer: None,
                    title_keys: vec!["title".to_string()],
                    price_key: default_price_key(),
                    base_unit_key: None,
                },
            ],
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 内置默认值 -> 配置文件 -> 环境变量
    ///
    /// 显式传入的文件必须存在；未传入时仅在默认文件存在时加载。
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        builder = match file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 应用命令行覆盖项并重新校验
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(path) = &overrides.products {
            self.products = path.clone();
        }
        for entry in &overrides.sources {
            let Some((id, path)) = entry.split_once('=') else {
                return Err(ReconError::InvalidConfig(format!("expected ID=PATH, got {entry}")));
            };
            let Some(source) = self.sources.iter_mut().find(|s| s.id.eq_ignore_ascii_case(id)) else {
                return Err(ReconError::InvalidConfig(format!("unknown source {id}")));
            };
            source.path = PathBuf::from(path);
        }
        if let Some(v) = overrides.min_score {
            self.matching.min_score = v;
        }
        if let Some(v) = overrides.min_token_overlap {
            self.matching.min_token_overlap = v;
        }
        if let Some(v) = overrides.min_score_gap {
            self.matching.min_score_gap = v;
        }
        if overrides.convert_packs {
            self.reconcile.convert_packs = true;
        }
        if let Some(mode) = overrides.report {
            self.report.mode = mode;
        }
        if let Some(path) = &overrides.csv {
            self.report.csv = Some(path.clone());
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        if self.sources.is_empty() {
            return Err(ReconError::InvalidConfig("at least one price source is required".into()));
        }
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(ReconError::InvalidConfig("source id must not be blank".into()));
            }
            if source.title_keys.is_empty() {
                return Err(ReconError::InvalidConfig(format!(
                    "source {} has no title keys",
                    source.id
                )));
            }
        }
        Ok(())
    }
}
