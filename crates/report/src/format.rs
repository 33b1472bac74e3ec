use std::fmt::Write as _;

use serde::Serialize;

use crate::coverage::{AnnotationMismatch, CoverageReport};

/// The serialized form of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
    pub seen_count: usize,
    pub span_count: usize,
    pub seen_categories: Vec<String>,
    pub missing_categories: Vec<String>,
    pub color_collisions: Vec<[String; 2]>,
    pub annotation_mismatches: Vec<AnnotationMismatch>,
    pub passed: bool,
}

impl ReportSummary {
    pub fn new(report: &CoverageReport) -> Self {
        Self {
            fixture: None,
            seen_count: report.seen_count(),
            span_count: report.span_count(),
            seen_categories: report.seen_categories().to_vec(),
            missing_categories: report.missing_categories().to_vec(),
            color_collisions: report
                .color_collisions()
                .iter()
                .map(|collision| [collision.first.clone(), collision.second.clone()])
                .collect(),
            annotation_mismatches: report.annotation_mismatches().to_vec(),
            passed: report.passed(),
        }
    }

    pub fn with_fixture(mut self, fixture: impl Into<String>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Plain-text rendering for terminals.
pub fn render_text(report: &CoverageReport, fixture: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(fixture) = fixture {
        let _ = writeln!(out, "fixture: {fixture}");
    }
    let total = report.seen_count() + report.missing_categories().len();
    let _ = writeln!(
        out,
        "seen {}/{} categories in {} spans",
        report.seen_count(),
        total,
        report.span_count()
    );

    if report.missing_categories().is_empty() {
        out.push_str("missing: none\n");
    } else {
        let _ = writeln!(
            out,
            "missing ({}): {}",
            report.missing_categories().len(),
            report.missing_categories().join(", ")
        );
    }

    if report.color_collisions().is_empty() {
        out.push_str("color collisions: none\n");
    } else {
        let _ = writeln!(out, "color collisions ({}):", report.color_collisions().len());
        for collision in report.color_collisions() {
            let _ = writeln!(
                out,
                "  {} ~ {} (dE {:.2})",
                collision.first, collision.second, collision.distance
            );
        }
    }

    if !report.annotation_mismatches().is_empty() {
        let _ = writeln!(
            out,
            "annotation mismatches ({}):",
            report.annotation_mismatches().len()
        );
        for mismatch in report.annotation_mismatches() {
            let _ = writeln!(
                out,
                "  line {}: '{}' ({}) annotated {} but expected {}",
                mismatch.line, mismatch.label, mismatch.category, mismatch.annotated, mismatch.expected
            );
        }
    }

    out.push_str(if report.passed() {
        "result: PASS\n"
    } else {
        "result: FAIL\n"
    });
    out
}
