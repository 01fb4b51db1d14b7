//! End-to-end reconciliation scenarios
//!
//! Runs the public library API the same way the binary does:
//! catalogs from JSON, indexes per source, parallel reconciliation, write-back.

use price_recon::catalog::{self, ProductCatalog};
use price_recon::config::{AppConfig, MatchConfig, SourceConfig};
use price_recon::models::{BaseUnit, Candidate, Listing, Query, TargetUnit};
use price_recon::service::{normalize, score, Decision, Rejection, Tokenizer, SINGLE_TOKEN_MIN_SCORE};
use price_recon::{MatcherService, ReconcileService, SourceIndex};
use serde_json::json;
use std::path::PathBuf;

// ─── Fixtures ─────────────────────────────────────────────────────

fn listing(title: &str, price: f64, base_unit: Option<&str>) -> Listing {
    Listing {
        title: title.to_string(),
        price,
        base_unit: base_unit.map(str::to_string),
    }
}

fn index(id: &str, listings: &[Listing]) -> SourceIndex {
    SourceIndex::from_listings(id, listings, &Tokenizer::default())
}

fn service(min_score: f64, convert_packs: bool) -> ReconcileService {
    let config = MatchConfig::new(min_score, 1, 0.06).unwrap();
    ReconcileService::new(MatcherService::new(config).unwrap(), convert_packs)
}

// ─── Properties ───────────────────────────────────────────────────

#[test]
fn normalization_is_idempotent() {
    let titles = [
        "Молоко Селянське 2.5% 900мл",
        "Сир «Звенигора» 50% 1,2 кг",
        "Pepsi Max 0.5л x 12 pcs",
        "Олія соняшникова рафінована ТМ Щедрий Лан 850 мл",
        "м`ясо / фарш (свинина+яловичина)",
    ];
    for title in titles {
        let once = normalize(title);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn score_is_reflexive_and_symmetric() {
    let t = Tokenizer::default();
    let a = normalize("Гречка ядриця Хуторок 1кг");
    let b = normalize("Крупа гречана ядриця 800 г");
    assert!((score(&t, &a, &a) - 1.0).abs() < 1e-12);
    assert_eq!(score(&t, &a, &b), score(&t, &b, &a));
}

// ─── Matching scenarios ───────────────────────────────────────────

#[test]
fn milk_pack_price_converts_to_per_liter() {
    let sources = [index("ATB", &[listing("Молоко 2.5% 900 мл", 45.0, None)])];
    let mut queries = vec![Query::new(
        0,
        "Молоко Селянське 2.5% 900мл",
        None,
        TargetUnit::parse("L"),
    )];

    let report = service(0.5, true).reconcile(&mut queries, &sources);

    assert_eq!(report.changes.len(), 1);
    assert!((report.changes[0].new_price - 50.0).abs() < 1e-9);
    assert!((queries[0].price.unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(report.updated("ATB"), 1);
}

#[test]
fn single_word_bread_does_not_match_derived_word() {
    let sources = [index("ATB", &[listing("Хлібна паляниця", 22.0, Some("PCS"))])];
    let matcher = MatcherService::new(MatchConfig::default()).unwrap();
    let result = matcher.find_best("хліб", TargetUnit::Pieces, &sources[0]);
    assert!(!result.is_match());
}

#[test]
fn single_word_floor_is_stricter_than_configured_minimum() {
    let sources = [index("ATB", &[listing("Хліб житній", 25.0, Some("PCS"))])];
    let matcher = MatcherService::new(MatchConfig::new(0.3, 1, 0.06).unwrap()).unwrap();
    let decision = matcher.decide("Хліб", TargetUnit::Pieces, &sources[0]);
    assert!(decision.score() < SINGLE_TOKEN_MIN_SCORE);
    assert!(matches!(
        decision,
        Decision::Rejected {
            reason: Rejection::SingleTokenBelowFloor,
            ..
        }
    ));
}

#[test]
fn close_runner_up_blocks_the_match() {
    let sources = [index(
        "METRO",
        &[
            listing("Йогурт Галичина полуниця", 25.0, None),
            listing("Йогурт Галичина полуниця 2.2%", 26.0, None),
        ],
    )];
    let mut queries = vec![Query::new(0, "Йогурт Галичина полуниця", Some(20.0), TargetUnit::Unspecified)];
    let report = service(0.62, false).reconcile(&mut queries, &sources);
    assert_eq!(report.skipped, 1);
    assert!(report.changes.is_empty());
    assert_eq!(queries[0].price, Some(20.0));
}

#[test]
fn pieces_query_never_takes_volume_listing() {
    let t = Tokenizer::default();
    let candidates = vec![
        Candidate::new("Вода Моршинська 6 шт 1.5 л", 120.0, Some(BaseUnit::Volume), &t).unwrap(),
    ];
    let source = SourceIndex::new("ATB", candidates);
    let matcher = MatcherService::new(MatchConfig::new(0.0, 1, 0.0).unwrap()).unwrap();
    let decision = matcher.decide("Вода Моршинська", TargetUnit::Pieces, &source);
    assert!(matches!(
        decision,
        Decision::Rejected {
            reason: Rejection::UnitIncompatible,
            ..
        }
    ));
}

#[test]
fn secondary_source_is_consulted_in_order() {
    let sources = [
        index("ATB", &[listing("Кава розчинна", 150.0, None)]),
        index("METRO", &[listing("Макарони спагеті Барілла", 65.0, None)]),
        index("SILPO", &[listing("Макарони спагеті Барілла", 70.0, None)]),
    ];
    let mut queries = vec![Query::new(0, "Макарони спагеті Барілла", Some(60.0), TargetUnit::Unspecified)];
    let report = service(0.62, false).reconcile(&mut queries, &sources);
    assert_eq!(report.updated("ATB"), 0);
    assert_eq!(report.updated("METRO"), 1);
    assert_eq!(report.updated("SILPO"), 0);
    assert_eq!(report.changes[0].source, "METRO");
}

#[test]
fn parallel_run_keeps_catalog_order() {
    let listings: Vec<Listing> = (0..50)
        .map(|i| listing(&format!("Товар {} унікальний", "а".repeat(i + 1)), 10.0 + i as f64, None))
        .collect();
    let sources = [index("ATB", &listings)];
    let mut queries: Vec<Query> = (0..50)
        .map(|i| {
            Query::new(
                i,
                format!("Товар {} унікальний", "а".repeat(i + 1)),
                None,
                TargetUnit::Unspecified,
            )
        })
        .collect();

    let report = service(0.62, false).reconcile(&mut queries, &sources);
    let positions: Vec<usize> = report.changes.iter().map(|c| c.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert_eq!(report.total, 50);
    assert_eq!(report.changes.len() + report.skipped, 50);
}

// ─── Files ────────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_from_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let products_path = dir.path().join("product_data.json");
    let atb_path = dir.path().join("atb.json");
    let metro_path = dir.path().join("metro.json");

    let products = json!([
        {"title": "Молоко Селянське 2.5% 900мл", "price": 40, "unit": "L", "category": "dairy"},
        {"title": "Гречка ядриця", "unit": "KG"},
        {"title": "Ананас консервований", "price": 99, "unit": "PCS"}
    ]);
    let atb = json!({"products": [
        {"name": "Молоко 2.5% 900 мл", "price": 45.0},
        {"name": "", "originalTitle": "Кава мелена", "price": 150, "baseUnit": "PCS"}
    ]});
    let metro = json!([{"title": "Гречка ядриця", "price": 58.9}]);
    for (path, doc) in [(&products_path, &products), (&atb_path, &atb), (&metro_path, &metro)] {
        tokio::fs::write(path, serde_json::to_vec(doc).unwrap()).await.unwrap();
    }

    let config = AppConfig {
        products: products_path.clone(),
        sources: vec![
            SourceConfig {
                path: atb_path,
                ..AppConfig::default().sources[0].clone()
            },
            SourceConfig {
                path: metro_path,
                ..AppConfig::default().sources[1].clone()
            },
        ],
        matching: MatchConfig::new(0.5, 1, 0.06).unwrap(),
        ..AppConfig::default()
    };
    config.validate().unwrap();

    let mut catalog = ProductCatalog::load(&config.products).await.unwrap();
    let tokenizer = Tokenizer::default();
    let mut sources = Vec::new();
    for source in &config.sources {
        let listings = catalog::load_listings(source).await.unwrap();
        sources.push(SourceIndex::from_listings(source.id.as_str(), &listings, &tokenizer));
    }

    let mut queries = catalog.queries();
    let svc = ReconcileService::new(MatcherService::new(config.matching).unwrap(), true);
    let report = svc.reconcile(&mut queries, &sources);

    assert_eq!(report.total, 3);
    assert_eq!(report.updated("ATB"), 1);
    assert_eq!(report.updated("METRO"), 1);
    assert_eq!(report.skipped_titles, vec!["Ананас консервований"]);

    catalog.apply(&report.changes);
    catalog.save().await.unwrap();

    let saved: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(&products_path).await.unwrap()).unwrap();
    assert!((saved[0]["price"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(saved[0]["category"], "dairy");
    assert_eq!(saved[1]["price"].as_f64(), Some(58.9));
    assert_eq!(saved[2]["price"].as_f64(), Some(99.0));
}

#[test]
fn default_config_points_at_original_catalogs() {
    let config = AppConfig::default();
    assert_eq!(config.products, PathBuf::from("product_data.json"));
    let ids: Vec<&str> = config.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["ATB", "METRO"]);
}
