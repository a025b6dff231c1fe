// src/output.rs
use std::fmt::Write as FmtWrite;
use std::path::PathBuf;
use serde::Serialize;
use crate::catalog::CatalogEntry;
use crate::compare::Comparison;
use crate::error_handling::{Context, Result};
use crate::processor::SoftwareGroup;
use crate::quiz::{QuizResult, budget_label};
use crate::scorer::ScoredEntry;

/// Rendered command output plus the file extension it should be saved with.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub content: String,
    pub ext: &'static str,
}

impl Report {
    pub fn text(content: String) -> Self {
        Self { content, ext: "txt" }
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let content = serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")?;
        Ok(Self { content, ext: "json" })
    }
}

/// Appends `.ext` unless the file name already ends with it.
///
/// Appending rather than `set_extension` keeps names like "my.report" intact.
pub fn with_report_extension(raw_path: &str, ext: &str) -> PathBuf {
    let mut path = PathBuf::from(raw_path);
    let should_append = path
        .file_name()
        .map(|name| !name.to_string_lossy().to_lowercase().ends_with(&format!(".{}", ext)))
        .unwrap_or(false);

    if should_append
        && let Some(stem) = path.file_name() {
            let mut new_name = stem.to_os_string();
            new_name.push(format!(".{}", ext));
            path.set_file_name(new_name);
        }
    path
}

/// Prints the report, or writes it to `output` when given.
pub fn emit(report: &Report, output: Option<&str>) -> Result<()> {
    match output {
        Some(raw_path) => {
            let path = with_report_extension(raw_path, report.ext);
            std::fs::write(&path, &report.content)
                .with_context(|| format!("Failed to write output to file '{}'", path.display()))?;
            println!("Successfully wrote report to '{}'", path.display());
        }
        None => println!("{}", report.content),
    }
    Ok(())
}

fn entry_line(buffer: &mut String, entry: &CatalogEntry) {
    let _ = writeln!(
        buffer,
        "  {} - {} | {} | rating {:.1}",
        entry.display_name(),
        entry.price_display(),
        entry.difficulty.label(),
        entry.rating
    );
}

pub fn render_entries(entries: &[&CatalogEntry]) -> String {
    let mut buffer = String::new();
    for entry in entries {
        entry_line(&mut buffer, entry);
    }
    let _ = writeln!(buffer, "{} entries", entries.len());
    buffer
}

pub fn render_groups(groups: &[SoftwareGroup]) -> String {
    let mut buffer = String::new();
    for group in groups {
        let _ = writeln!(
            buffer,
            "[{}] {} | difficulty {} | {} version(s)",
            group.name,
            group.price_range,
            group.difficulty_range,
            group.version_count()
        );
        for version in &group.versions {
            entry_line(&mut buffer, version);
        }
    }
    buffer
}

pub fn render_recommendations(answers: &QuizResult, ranked: &[ScoredEntry]) -> String {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Based on your preferences: {} | {} level | Budget: {} per month",
        answers.primary_use,
        answers.experience.as_str(),
        budget_label(answers.budget)
    );
    let _ = writeln!(buffer, "We found {} options that match your criteria.", ranked.len());
    for (rank, scored) in ranked.iter().enumerate() {
        let b = &scored.breakdown;
        let _ = writeln!(
            buffer,
            "{:>3}. {} ({:.1}) - {}",
            rank + 1,
            scored.entry.display_name(),
            scored.score,
            scored.entry.price_display()
        );
        let _ = writeln!(
            buffer,
            "     budget {:.1} | use {:.1} | experience {:.1} | platform {:.1} | features {:.1} | rating {:.1}",
            b.budget, b.primary_use, b.experience, b.platform, b.features, b.rating
        );
    }
    buffer
}

pub fn render_comparison(comparison: &Comparison) -> String {
    let mut buffer = String::new();
    let selected = comparison.selected();
    let names: Vec<String> = selected.iter().map(|e| e.display_name()).collect();
    let _ = writeln!(buffer, "Comparing: {}", names.join(" vs "));

    let row = |buffer: &mut String, label: &str, cells: Vec<String>| {
        let _ = writeln!(buffer, "  {:<12} {}", label, cells.join(" | "));
    };
    row(&mut buffer, "Price", selected.iter().map(|e| e.price_display()).collect());
    row(&mut buffer, "Rating", selected.iter().map(|e| format!("{:.1}/5", e.rating)).collect());
    row(&mut buffer, "Difficulty", selected.iter().map(|e| e.difficulty.label().to_string()).collect());
    row(&mut buffer, "Platforms", selected.iter().map(|e| e.platforms.join(", ")).collect());

    let _ = writeln!(buffer, "Features:");
    for feature_row in comparison.feature_matrix() {
        let marks: Vec<&str> = feature_row.present.iter().map(|&p| if p { "yes" } else { "-" }).collect();
        let _ = writeln!(buffer, "  {:<32} {}", feature_row.feature, marks.join(" | "));
    }
    buffer
}
