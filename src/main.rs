use clap::Parser;
use price_recon::catalog::{self, ProductCatalog};
use price_recon::config::{Overrides, ReportMode};
use price_recon::service::Tokenizer;
use price_recon::{report, AppConfig, MatcherService, ReconError, ReconcileService, SourceIndex};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// 用外部商品目录刷新目标目录中的价格
#[derive(Debug, Parser)]
#[command(name = "price-recon", version, about)]
struct Cli {
    /// 配置文件 (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// 目标商品目录
    #[arg(long)]
    product_data: Option<PathBuf>,
    /// 覆盖来源文件路径，格式 ID=PATH，可重复
    #[arg(long = "source", value_name = "ID=PATH")]
    sources: Vec<String>,
    /// 实际写回目标目录；否则只输出报告
    #[arg(long)]
    write: bool,
    #[arg(long)]
    min_score: Option<f64>,
    #[arg(long)]
    min_token_overlap: Option<usize>,
    #[arg(long)]
    min_score_gap: Option<f64>,
    /// 把包装价 (950г / 1л / 8шт) 换算为目标单位价
    #[arg(long)]
    convert_packs: bool,
    #[arg(long, value_enum)]
    report: Option<ReportMode>,
    /// 变更明细导出为 CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            products: self.product_data.clone(),
            sources: self.sources.clone(),
            min_score: self.min_score,
            min_token_overlap: self.min_token_overlap,
            min_score_gap: self.min_score_gap,
            convert_packs: self.convert_packs,
            report: self.report,
            csv: self.csv.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides())?;
    info!("Starting reconciliation with config: {:?}", config);

    // 所有 I/O 在匹配阶段之前完成
    let mut products = ProductCatalog::load(&config.products).await?;
    let mut source_listings = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        source_listings.push((source.id.clone(), catalog::load_listings(source).await?));
    }

    let matcher = MatcherService::new(config.matching)?;
    let service = ReconcileService::new(matcher, config.reconcile.convert_packs);
    let mut queries = products.queries();

    // 建索引和匹配都是纯 CPU 计算，放到阻塞线程池中运行
    let (report, queries) = tokio::task::spawn_blocking(move || {
        let tokenizer = Tokenizer::default();
        let sources: Vec<SourceIndex> = source_listings
            .iter()
            .map(|(id, listings)| SourceIndex::from_listings(id.as_str(), listings, &tokenizer))
            .collect();
        let report = service.reconcile(&mut queries, &sources);
        (report, queries)
    })
    .await
    .map_err(|e| ReconError::Worker(e.to_string()))?;
    info!("Reconciled {} products", queries.len());

    print!("{}", report::render(&report, config.report.mode));

    if let Some(path) = &config.report.csv {
        report::write_csv(path, &report.changes)?;
    }

    if cli.write {
        products.apply(&report.changes);
        products.save().await?;
        println!("\nWrote: {}", products.path().display());
    } else {
        println!("\nDry-run only. Add --write to overwrite {}", products.path().display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "price-recon",
            "--source",
            "ATB=/tmp/atb.json",
            "--min-score=-1",
            "--convert-packs",
            "--report",
            "skipped",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.sources, vec!["ATB=/tmp/atb.json"]);
        assert_eq!(overrides.report, Some(ReportMode::Skipped));
        assert!(overrides.convert_packs);

        let mut config = AppConfig::default();
        assert!(config.apply_overrides(&overrides).is_err());
    }
}
