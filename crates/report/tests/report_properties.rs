use std::collections::HashSet;

use proptest::prelude::*;
use themecheck_catalog::Catalog;
use themecheck_report::{report, ReportConfig};
use themecheck_scanner::{scan, Span};

const SNIPPET: &str = r#"[a-zA-Z0-9_ =;:,.(){}<>'"@/*+\-\n]{0,160}"#;

fn spans_of(catalog: &Catalog, source: &str) -> Vec<Span> {
    scan(catalog, source).unwrap_or_default()
}

proptest! {
    #[test]
    fn empty_catalog_is_always_fully_covered(source in SNIPPET) {
        let catalog = Catalog::empty();
        let spans = spans_of(&catalog, &source);
        let report = report(&catalog, &spans, &ReportConfig::default()).unwrap();
        prop_assert!(report.missing_categories().is_empty());
        prop_assert!(report.passed());
    }

    #[test]
    fn collision_pairs_are_unordered_and_unique(source in SNIPPET, threshold in 0.0f64..60.0) {
        let catalog = Catalog::builtin();
        let spans = spans_of(&catalog, &source);
        let config = ReportConfig { threshold, ..ReportConfig::default() };
        let report = report(&catalog, &spans, &config).unwrap();
        let mut pairs = HashSet::new();
        for collision in report.color_collisions() {
            prop_assert_ne!(&collision.first, &collision.second);
            prop_assert!(collision.distance <= threshold);
            let first = catalog.position(&collision.first).unwrap();
            let second = catalog.position(&collision.second).unwrap();
            prop_assert!(first < second);
            prop_assert!(pairs.insert((first, second)));
            prop_assert!(!pairs.contains(&(second, first)));
        }
    }

    #[test]
    fn report_is_idempotent(source in SNIPPET) {
        let catalog = Catalog::builtin();
        let spans = spans_of(&catalog, &source);
        let config = ReportConfig::default();
        prop_assert_eq!(
            report(&catalog, &spans, &config).unwrap(),
            report(&catalog, &spans, &config).unwrap()
        );
    }

    #[test]
    fn seen_and_missing_partition_the_catalog(source in SNIPPET) {
        let catalog = Catalog::builtin();
        let spans = spans_of(&catalog, &source);
        let report = report(&catalog, &spans, &ReportConfig::default()).unwrap();
        prop_assert_eq!(report.seen_count() + report.missing_categories().len(), catalog.len());
        prop_assert_eq!(report.span_count(), spans.len());
    }
}
