use serde::{Deserialize, Serialize};
use themecheck_catalog::{Catalog, CatalogError, Rgb};
use themecheck_scanner::{Annotation, Span};
use tracing::{debug, info};

use crate::error::ReportError;

pub const DEFAULT_THRESHOLD: f64 = 10.0;

/// Knobs that decide when a report fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Color pairs whose CIE76 distance is at or below this value collide.
    pub threshold: f64,
    /// Skip pairs whose style modifiers differ, since italics or weight still tell them apart.
    pub distinguish_styles: bool,
    /// Fail the report when fixture annotations disagree with the catalog.
    pub strict_annotations: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            distinguish_styles: false,
            strict_annotations: false,
        }
    }
}

/// Two seen categories whose colors are too close. `first` is declared before `second`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCollision {
    pub first: String,
    pub second: String,
    pub distance: f64,
}

impl ColorCollision {
    /// True when the pair names both categories, in either order.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// A fixture comment whose color disagrees with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationMismatch {
    pub line: usize,
    pub label: String,
    pub category: String,
    pub annotated: Rgb,
    pub expected: Rgb,
}

/// The outcome of checking one fixture. Built once by [`report`]; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    seen: Vec<String>,
    missing: Vec<String>,
    collisions: Vec<ColorCollision>,
    mismatches: Vec<AnnotationMismatch>,
    span_count: usize,
    strict_annotations: bool,
}

impl CoverageReport {
    pub fn seen_categories(&self) -> &[String] {
        &self.seen
    }

    pub fn missing_categories(&self) -> &[String] {
        &self.missing
    }

    pub fn color_collisions(&self) -> &[ColorCollision] {
        &self.collisions
    }

    pub fn annotation_mismatches(&self) -> &[AnnotationMismatch] {
        &self.mismatches
    }

    /// Number of distinct categories with at least one span.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn span_count(&self) -> usize {
        self.span_count
    }

    pub fn passed(&self) -> bool {
        self.missing.is_empty()
            && self.collisions.is_empty()
            && (!self.strict_annotations || self.mismatches.is_empty())
    }
}

/// Cross-references `spans` with `catalog`.
pub fn report(
    catalog: &Catalog,
    spans: &[Span],
    config: &ReportConfig,
) -> Result<CoverageReport, ReportError> {
    report_with_annotations(catalog, spans, &[], config)
}

/// Like [`report`], also checking fixture annotations against expected colors.
pub fn report_with_annotations(
    catalog: &Catalog,
    spans: &[Span],
    annotations: &[Annotation],
    config: &ReportConfig,
) -> Result<CoverageReport, ReportError> {
    let mut seen_flags = vec![false; catalog.len()];
    for span in spans {
        let position = catalog
            .position(&span.category)
            .ok_or_else(|| CatalogError::UnknownCategory(span.category.clone()))?;
        seen_flags[position] = true;
    }

    let entries: Vec<_> = catalog.entries().collect();
    let mut seen = Vec::new();
    let mut missing = Vec::new();
    for ((category, _), was_seen) in entries.iter().zip(&seen_flags) {
        if *was_seen {
            seen.push(category.name().to_string());
        } else {
            missing.push(category.name().to_string());
        }
    }

    let mut collisions = Vec::new();
    for (i, (first, first_color)) in entries.iter().enumerate() {
        if !seen_flags[i] {
            continue;
        }
        for (j, (second, second_color)) in entries.iter().enumerate().skip(i + 1) {
            if !seen_flags[j] {
                continue;
            }
            if config.distinguish_styles && first.modifiers() != second.modifiers() {
                continue;
            }
            let distance = first_color.distance(*second_color);
            if distance <= config.threshold {
                debug!(
                    first = first.name(),
                    second = second.name(),
                    distance,
                    "color collision"
                );
                collisions.push(ColorCollision {
                    first: first.name().to_string(),
                    second: second.name().to_string(),
                    distance,
                });
            }
        }
    }

    let mismatches = check_annotations(catalog, annotations)?;

    info!(
        seen = seen.len(),
        missing = missing.len(),
        collisions = collisions.len(),
        mismatches = mismatches.len(),
        "coverage computed"
    );
    Ok(CoverageReport {
        seen,
        missing,
        collisions,
        mismatches,
        span_count: spans.len(),
        strict_annotations: config.strict_annotations,
    })
}

fn check_annotations(
    catalog: &Catalog,
    annotations: &[Annotation],
) -> Result<Vec<AnnotationMismatch>, CatalogError> {
    let mut mismatches = Vec::new();
    for annotation in annotations {
        let Some(category) = catalog.find_by_label(&annotation.label) else {
            debug!(line = annotation.line, label = %annotation.label, "annotation names no category");
            continue;
        };
        let expected = catalog.expected_color(category.name())?;
        if expected != annotation.color {
            mismatches.push(AnnotationMismatch {
                line: annotation.line,
                label: annotation.label.clone(),
                category: category.name().to_string(),
                annotated: annotation.color,
                expected,
            });
        }
    }
    Ok(mismatches)
}
