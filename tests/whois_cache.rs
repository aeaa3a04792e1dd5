//! WHOIS cache and enrichment behavior against an on-disk SQLite file.

mod helpers;

use helpers::CountingLookup;
use origin_audit::capture::CaptureAccumulator;
use origin_audit::whois::whois_data_valid;
use origin_audit::{CapturedRequest, ComparisonOrigins, Enricher, OriginMode, RegistrantRecord, WhoisCache};
use tempfile::TempDir;

fn classified(urls: &[&str]) -> CaptureAccumulator {
    let mut acc = CaptureAccumulator::new();
    for url in urls {
        acc.record(CapturedRequest::new(url, "script"));
    }
    let none: [&str; 0] = [];
    let origins =
        ComparisonOrigins::new("https://a.example", &none, OriginMode::ExactOrigin);
    acc.classify(&origins);
    acc
}

#[tokio::test]
async fn test_cache_schema_matches_documented_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.sqlite3");
    let cache = WhoisCache::open(&path).await.unwrap();
    cache.close().await;

    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", path.display()))
        .await
        .unwrap();
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('whois')")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(
        columns,
        vec![
            "domain",
            "registrantName",
            "registrantOrganization",
            "registrantCountry"
        ]
    );
    pool.close().await;
}

#[tokio::test]
async fn test_only_valid_records_reach_the_cache() {
    let dir = TempDir::new().unwrap();
    let cache = WhoisCache::open(&dir.path().join("cache.sqlite3")).await.unwrap();
    let lookup = CountingLookup::new(&[
        ("b.example", "Registrant Country: DE\n"),
        ("c.example", "No match for domain\n"),
    ]);
    let mut acc = classified(&["https://cdn.b.example/x.js", "https://c.example/y.js"]);

    let summary = Enricher::new(&cache, &lookup)
        .enrich(acc.groups_mut())
        .await;

    assert_eq!(summary.lookups, 2);
    assert_eq!(summary.cached, 1);
    assert_eq!(cache.entry_count().await.unwrap(), 1);

    let stored = cache.read("b.example").await.unwrap().unwrap();
    assert!(whois_data_valid(&stored));
    assert_eq!(cache.read("c.example").await.unwrap(), None);
    cache.close().await;
}

#[tokio::test]
async fn test_enrich_twice_with_warm_cache_does_no_lookups() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.sqlite3");
    let lookup = CountingLookup::new(&[
        ("b.example", "Registrant Name: B Corp\n"),
        ("c.example", "Registrant Organization: C Ltd\n"),
    ]);
    let urls = [
        "https://a.example/app.js",
        "https://cdn.b.example/x.js",
        "https://c.example/y.js",
        "https://www.c.example/z.js",
    ];

    let cache = WhoisCache::open(&path).await.unwrap();
    let mut first = classified(&urls);
    Enricher::new(&cache, &lookup).enrich(first.groups_mut()).await;
    cache.close().await;
    assert_eq!(lookup.count(), 2);

    let cache = WhoisCache::open(&path).await.unwrap();
    let mut second = classified(&urls);
    let summary = Enricher::new(&cache, &lookup).enrich(second.groups_mut()).await;
    cache.close().await;

    assert_eq!(lookup.count(), 2);
    assert_eq!(summary.cache_hits, 2);
    assert_eq!(first.groups(), second.groups());
}

#[tokio::test]
async fn test_preexisting_rows_are_trusted_over_lookup() {
    let dir = TempDir::new().unwrap();
    let cache = WhoisCache::open(&dir.path().join("cache.sqlite3")).await.unwrap();
    let seeded = RegistrantRecord {
        registrant_organization: "Seeded Org".to_string(),
        ..RegistrantRecord::blank("b.example")
    };
    assert!(cache.write(&seeded).await.unwrap());
    let lookup = CountingLookup::new(&[("b.example", "Registrant Organization: Fresh Org\n")]);
    let mut acc = classified(&["https://cdn.b.example/x.js"]);

    Enricher::new(&cache, &lookup).enrich(acc.groups_mut()).await;

    assert_eq!(lookup.count(), 0);
    assert_eq!(acc.groups()[0].requests[0].registrant, Some(seeded));
    cache.close().await;
}

#[tokio::test]
async fn test_failed_write_is_not_counted_as_cached() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.sqlite3");
    let cache = WhoisCache::open(&path).await.unwrap();

    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", path.display()))
        .await
        .unwrap();
    sqlx::query("DROP TABLE whois").execute(&pool).await.unwrap();
    pool.close().await;

    let lookup = CountingLookup::new(&[("b.example", "Registrant Name: B Corp\n")]);
    let mut acc = classified(&["https://cdn.b.example/x.js"]);

    let summary = Enricher::new(&cache, &lookup).enrich(acc.groups_mut()).await;

    assert_eq!(summary.lookups, 1);
    assert_eq!(summary.cached, 0);
    assert_eq!(
        acc.groups()[0].requests[0]
            .registrant
            .as_ref()
            .unwrap()
            .registrant_name,
        "B Corp"
    );
    cache.close().await;
}
