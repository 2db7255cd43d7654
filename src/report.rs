use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

use crate::models::{AuthorSummary, EngagementLevel, InsightRecord, LevelSummary};

const UNKNOWN_AUTHOR: &str = "(unknown)";

pub fn summarize_by_level(records: &[InsightRecord]) -> Vec<LevelSummary> {
    let mut map: HashMap<EngagementLevel, (usize, f64)> = HashMap::new();

    for record in records {
        let entry = map.entry(record.engagement_level).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.engagement_score;
    }

    EngagementLevel::ALL
        .into_iter()
        .filter_map(|level| {
            map.get(&level).map(|&(count, total)| LevelSummary {
                level,
                count,
                avg_score: total / count as f64,
            })
        })
        .collect()
}

pub fn summarize_by_author(records: &[InsightRecord]) -> Vec<AuthorSummary> {
    let mut map: HashMap<&str, (usize, f64)> = HashMap::new();

    for record in records {
        let author = record.author.as_deref().unwrap_or(UNKNOWN_AUTHOR);
        let entry = map.entry(author).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.engagement_score;
    }

    let mut summaries: Vec<AuthorSummary> = map
        .into_iter()
        .map(|(author, (insight_count, total))| AuthorSummary {
            author: author.to_string(),
            insight_count,
            avg_score: total / insight_count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.author.cmp(&b.author))
    });
    summaries
}

pub fn build_report(records: &[InsightRecord]) -> String {
    let levels = summarize_by_level(records);
    let authors = summarize_by_author(records);

    let mut output = String::new();

    let _ = writeln!(output, "# Engagement Insights Report");
    let _ = writeln!(output, "Generated from {} stored insights", records.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Engagement Mix");

    if levels.is_empty() {
        let _ = writeln!(output, "No insights recorded yet.");
    } else {
        for summary in levels.iter() {
            let _ = writeln!(
                output,
                "- {}: {} messages (avg score {:.2})",
                summary.level, summary.count, summary.avg_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Engaging Authors");

    if authors.is_empty() {
        let _ = writeln!(output, "No authors recorded yet.");
    } else {
        for summary in authors.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} avg score {:.2} across {} messages",
                summary.author, summary.avg_score, summary.insight_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Insights");

    if records.is_empty() {
        let _ = writeln!(output, "No insights recorded yet.");
    } else {
        for record in records.iter().rev().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) at {}: {} ({:.2})",
                record.author.as_deref().unwrap_or(UNKNOWN_AUTHOR),
                record.category.as_deref().unwrap_or("uncategorized"),
                record.processed_at,
                record.engagement_level,
                record.engagement_score
            );
        }
    }

    output
}

pub fn export_csv(records: &[InsightRecord], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
