// Capture module tests.

use super::*;
use crate::origin::OriginMode;

fn origins(page: &str, mode: OriginMode) -> ComparisonOrigins {
    let none: [&str; 0] = [];
    ComparisonOrigins::new(page, &none, mode)
}

fn accumulator_with(requests: &[(&str, &str)]) -> CaptureAccumulator {
    let mut acc = CaptureAccumulator::new();
    for (url, resource_type) in requests {
        acc.record(CapturedRequest::new(url, resource_type));
    }
    acc
}

#[test]
fn test_percentage_rounds_to_two_decimals() {
    assert_eq!(cross_origin_percentage(2, 3), Some(66.67));
    assert_eq!(cross_origin_percentage(1, 3), Some(33.33));
    assert_eq!(cross_origin_percentage(1, 8), Some(12.5));
    assert_eq!(cross_origin_percentage(0, 5), Some(0.0));
    assert_eq!(cross_origin_percentage(5, 5), Some(100.0));
}

#[test]
fn test_percentage_undefined_for_empty_group() {
    assert_eq!(cross_origin_percentage(0, 0), None);
}

#[test]
fn test_record_groups_by_type_in_first_seen_order() {
    let acc = accumulator_with(&[
        ("https://a.example/", "document"),
        ("https://a.example/app.js", "script"),
        ("https://a.example/site.css", "stylesheet"),
        ("https://cdn.b.example/lib.js", "script"),
        ("https://a.example/logo.png", "image"),
    ]);

    let types: Vec<&str> = acc
        .groups()
        .iter()
        .map(|g| g.resource_type.as_str())
        .collect();
    assert_eq!(types, vec!["document", "script", "stylesheet", "image"]);
    assert_eq!(acc.groups()[1].requests.len(), 2);
    assert_eq!(acc.request_count(), 5);
}

#[test]
fn test_unclassified_requests_have_no_verdict() {
    let acc = accumulator_with(&[("https://a.example/app.js", "script")]);
    assert_eq!(acc.groups()[0].requests[0].cross_origin, None);
    assert_eq!(acc.groups()[0].total_count, 0);
}

#[test]
fn test_classify_end_to_end_scenario_counts() {
    let mut acc = accumulator_with(&[
        ("https://a.example/app.js", "script"),
        ("https://cdn.b.example/lib.js", "script"),
        ("https://cdn.b.example/lib2.js", "script"),
    ]);
    acc.classify(&origins("https://a.example", OriginMode::ExactOrigin));

    let group = &acc.groups()[0];
    assert_eq!(group.total_count, 3);
    assert_eq!(group.same_origin_count, 1);
    assert_eq!(group.cross_origin_count, 2);
    assert_eq!(group.cross_origin_percentage, Some(66.67));

    let verdicts: Vec<Option<bool>> = group.requests.iter().map(|r| r.cross_origin).collect();
    assert_eq!(verdicts, vec![Some(false), Some(true), Some(true)]);
}

#[test]
fn test_classify_mode_changes_subdomain_verdict() {
    let requests = [
        ("https://www.example.com/", "document"),
        ("https://static.example.com/site.css", "stylesheet"),
    ];

    let mut exact = accumulator_with(&requests);
    exact.classify(&origins("https://www.example.com", OriginMode::ExactOrigin));
    assert_eq!(exact.totals().cross_origin_count, 1);

    let mut root = accumulator_with(&requests);
    root.classify(&origins("https://www.example.com", OriginMode::RootDomain));
    assert_eq!(root.totals().cross_origin_count, 0);
}

#[test]
fn test_classify_matches_membership_for_every_request() {
    let cmp = origins("https://a.example", OriginMode::ExactOrigin);
    let mut acc = accumulator_with(&[
        ("https://a.example/", "document"),
        ("http://a.example/insecure.js", "script"),
        ("https://a.example:8443/api", "xhr"),
        ("data:image/gif;base64,R0lGOD", "image"),
        ("https://tracker.c.example/p.gif", "image"),
        ("not a url", "other"),
    ]);
    acc.classify(&cmp);

    for group in acc.groups() {
        assert_eq!(
            group.same_origin_count + group.cross_origin_count,
            group.total_count
        );
        for request in &group.requests {
            let expected = !cmp.contains(&crate::origin::resolve(&request.url, cmp.mode()));
            assert_eq!(request.cross_origin, Some(expected), "{}", request.url);
        }
    }
    assert_eq!(acc.totals().same_origin_count, 1);
}

#[test]
fn test_classify_is_idempotent() {
    let cmp = origins("https://a.example", OriginMode::ExactOrigin);
    let mut acc = accumulator_with(&[
        ("https://a.example/app.js", "script"),
        ("https://cdn.b.example/lib.js", "script"),
    ]);

    acc.classify(&cmp);
    let first = acc.groups().to_vec();
    acc.classify(&cmp);

    assert_eq!(acc.groups(), first.as_slice());
}

#[test]
fn test_totals_sum_groups() {
    let mut acc = accumulator_with(&[
        ("https://a.example/", "document"),
        ("https://a.example/app.js", "script"),
        ("https://cdn.b.example/lib.js", "script"),
        ("https://fonts.c.example/f.woff2", "font"),
    ]);
    acc.classify(&origins("https://a.example", OriginMode::ExactOrigin));

    let totals = acc.totals();
    assert_eq!(totals.total_count, 4);
    assert_eq!(totals.same_origin_count, 2);
    assert_eq!(totals.cross_origin_count, 2);
    assert_eq!(totals.cross_origin_percentage, Some(50.0));
}

#[test]
fn test_totals_of_nothing() {
    let acc = CaptureAccumulator::new();
    assert_eq!(acc.totals(), CaptureTotals::default());
    assert_eq!(acc.totals().cross_origin_percentage, None);
}

#[tokio::test]
async fn test_collect_drains_channel_until_senders_drop() {
    let (tx, rx) = mpsc::channel(2);

    let producer = async move {
        for (url, kind) in [
            ("https://a.example/", "document"),
            ("https://a.example/app.js", "script"),
            ("https://cdn.b.example/lib.js", "script"),
            ("https://a.example/logo.png", "image"),
        ] {
            tx.send(CapturedRequest::new(url, kind)).await.unwrap();
        }
    };

    let ((), acc) = tokio::join!(producer, CaptureAccumulator::collect(rx));

    assert_eq!(acc.request_count(), 4);
    assert_eq!(acc.groups().len(), 3);
}

#[test]
fn test_serialized_request_uses_camel_case_and_skips_unset_fields() {
    let request = CapturedRequest::new("https://a.example/app.js", "script");
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["resourceType"], "script");
    assert_eq!(json["method"], "GET");
    assert!(json.get("crossOrigin").is_none());
    assert!(json.get("registrant").is_none());
}
