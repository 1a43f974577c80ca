//! Format resolved paths, video sequences and merge outcomes for the terminal.

use crate::merge::{MergeOutcome, MergeReceipt};
use crate::path::FramePath;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format a resolved path as a table, root first.
pub fn format_path_text(path: &FramePath) -> String {
    if path.is_empty() {
        return "No path found for the selected frame.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Frame", "Arrow", "Status", "Video"]);
    for (index, step) in path.steps().iter().enumerate() {
        let (arrow, status, video) = match &step.arrow {
            Some(arrow) => (
                arrow.id.to_string(),
                format!("{:?}", arrow.meta.status).to_lowercase(),
                arrow.completed_video().unwrap_or("-").to_string(),
            ),
            None => ("(root)".to_string(), "-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            index.to_string(),
            step.frame.id.to_string(),
            arrow,
            status,
            video,
        ]);
    }

    format!(
        "{}\n\n{}\n\nLength: {}",
        format_section_heading("Frame path"),
        table,
        path.len()
    )
}

/// Format a resolved path as JSON.
pub fn format_path_json(path: &FramePath) -> String {
    let steps: Vec<_> = path
        .steps()
        .iter()
        .map(|step| {
            json!({
                "frame_id": step.frame.id,
                "arrow_id": step.arrow.as_ref().map(|a| a.id.clone()),
                "status": step.arrow.as_ref().map(|a| a.meta.status),
                "video_url": step.arrow.as_ref().and_then(|a| a.completed_video()),
            })
        })
        .collect();
    let out = json!({ "path": steps, "length": path.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

/// Format the extracted sequence, one URL per line in merge order.
pub fn format_videos_text(videos: &[String]) -> String {
    if videos.is_empty() {
        return "No videos found in the path from root to selected frame.".to_string();
    }
    let mut out = String::new();
    for (index, url) in videos.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", index + 1, url));
    }
    out.push_str(&format!("\nTotal: {} video(s)", videos.len()));
    out
}

pub fn format_videos_json(videos: &[String]) -> String {
    let out = json!({ "video_urls": videos, "total": videos.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

/// Summarize a finished merge.
pub fn format_receipt_text(receipt: &MergeReceipt) -> String {
    let mut out = format!(
        "Merged {} videos\n  Result: {}\n",
        receipt.video_count, receipt.video_url
    );
    match &receipt.delivery {
        Ok(path) => out.push_str(&format!("  Saved to: {}", path.display())),
        Err(err) => out.push_str(&format!("  Download failed: {}", err)),
    }
    out
}

/// One-line label for an outcome, used in logs and summaries.
pub fn outcome_label(outcome: &MergeOutcome) -> &'static str {
    match outcome {
        MergeOutcome::Ignored => "ignored",
        MergeOutcome::Rejected(_) => "rejected",
        MergeOutcome::Failed(_) => "failed",
        MergeOutcome::Merged(receipt) if receipt.delivery.is_ok() => "merged",
        MergeOutcome::Merged(_) => "merged_not_downloaded",
    }
}
