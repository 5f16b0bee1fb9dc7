//! Output formatting for snapshots and analyses (table, JSON, markdown).

use crate::analysis::{AnalysisResult, ListingMetrics};
use crate::config::OutputFormat;
use crate::listing::ListingSnapshot;

const NA: &str = "N/A";

/// Formats scrape and analysis results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a listing snapshot.
    pub fn format_snapshot(&self, snapshot: &ListingSnapshot) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_snapshot(snapshot),
            OutputFormat::Markdown => self.markdown_snapshot(snapshot),
        }
    }

    /// Formats an analysis result.
    pub fn format_analysis(&self, analysis: &AnalysisResult) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_analysis(analysis),
            OutputFormat::Markdown => self.markdown_analysis(analysis),
        }
    }

    /// Formats a snapshot together with its analysis.
    pub fn format_report(&self, snapshot: &ListingSnapshot, analysis: &AnalysisResult) -> String {
        match self.format {
            OutputFormat::Json => {
                let report = serde_json::json!({ "snapshot": snapshot, "analysis": analysis });
                serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
            }
            _ => format!("{}\n\n{}", self.format_snapshot(snapshot), self.format_analysis(analysis)),
        }
    }

    // Table formatting

    fn table_snapshot(&self, snapshot: &ListingSnapshot) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Title:       {}", snapshot.title.as_deref().unwrap_or(NA)));
        lines.push(format!("URL:         {}", snapshot.source_url));
        if let Some(id) = &snapshot.listing_id {
            lines.push(format!("Listing:     {}", id));
        }
        lines.push(format!("Price:       {}", display_price(snapshot)));
        lines.push(format!("Seller:      {}", snapshot.seller_name.as_deref().unwrap_or(NA)));
        lines.push(format!("Condition:   {}", snapshot.condition.as_deref().unwrap_or(NA)));
        lines.push(format!("Description: {} characters", snapshot.description_length));
        lines.push(format!("Photos:      {}", snapshot.image_count));

        for (i, url) in snapshot.image_urls.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, url));
        }

        lines.push(format!("Captured:    {}", snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC")));

        lines.join("\n")
    }

    fn table_analysis(&self, analysis: &AnalysisResult) -> String {
        let label_width = 14;
        let col_width = 20;
        let mut lines = Vec::new();

        lines.push(format!("Rating: {} {:.1}/5", stars(analysis.rating), analysis.rating));
        lines.push(String::new());

        lines.push(format!(
            "{:<label_width$}  {:<col_width$}  {:<col_width$}",
            "", "Your listing", "Best competitor"
        ));
        lines.push(format!("{:-<label_width$}  {:-<col_width$}  {:-<col_width$}", "", "", ""));

        for (label, ours, theirs) in metric_rows(&analysis.your_listing, &analysis.best_competitor) {
            lines.push(format!(
                "{:<label_width$}  {:<col_width$}  {:<col_width$}",
                label,
                truncate(&ours, col_width),
                truncate(&theirs, col_width)
            ));
        }

        if let Some(url) = &analysis.best_competitor.url {
            lines.push(String::new());
            lines.push(format!("Competitor: {}", url));
        }

        if !analysis.advantages.is_empty() {
            lines.push(String::new());
            lines.push("Competitor advantages:".to_string());
            for advantage in &analysis.advantages {
                lines.push(format!("  - {}", advantage));
            }
        }

        if !analysis.suggestions.is_empty() {
            lines.push(String::new());
            lines.push("Suggestions:".to_string());
            lines.push(analysis.suggestions.clone());
        }

        if !analysis.improved_description.is_empty() {
            lines.push(String::new());
            lines.push("Improved description:".to_string());
            lines.push(analysis.improved_description.clone());
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_snapshot(&self, snapshot: &ListingSnapshot) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", snapshot.title.as_deref().unwrap_or("Untitled listing")));
        lines.push(String::new());

        lines.push(format!("- **URL:** [View listing]({})", snapshot.source_url));
        lines.push(format!("- **Price:** {}", display_price(snapshot)));
        if let Some(seller) = &snapshot.seller_name {
            lines.push(format!("- **Seller:** {}", seller));
        }
        if let Some(condition) = &snapshot.condition {
            lines.push(format!("- **Condition:** {}", condition));
        }
        lines.push(format!("- **Description:** {} characters", snapshot.description_length));
        lines.push(format!("- **Photos:** {}", snapshot.image_count));

        if !snapshot.image_urls.is_empty() {
            lines.push(String::new());
            for (i, url) in snapshot.image_urls.iter().enumerate() {
                lines.push(format!("![Photo {}]({})", i + 1, url));
            }
        }

        lines.join("\n")
    }

    fn markdown_analysis(&self, analysis: &AnalysisResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## Rating: {} ({:.1}/5)", stars(analysis.rating), analysis.rating));
        lines.push(String::new());

        lines.push("| Metric | Your listing | Best competitor |".to_string());
        lines.push("|--------|--------------|-----------------|".to_string());
        for (label, ours, theirs) in metric_rows(&analysis.your_listing, &analysis.best_competitor) {
            lines.push(format!("| {} | {} | {} |", label, ours, theirs));
        }

        if let Some(url) = &analysis.best_competitor.url {
            lines.push(String::new());
            lines.push(format!("[Best competitor]({})", url));
        }

        if !analysis.advantages.is_empty() {
            lines.push(String::new());
            lines.push("### Competitor advantages".to_string());
            lines.push(String::new());
            for advantage in &analysis.advantages {
                lines.push(format!("- {}", advantage));
            }
        }

        if !analysis.suggestions.is_empty() {
            lines.push(String::new());
            lines.push("### Suggestions".to_string());
            lines.push(String::new());
            lines.push(analysis.suggestions.clone());
        }

        if !analysis.improved_description.is_empty() {
            lines.push(String::new());
            lines.push("### Improved description".to_string());
            lines.push(String::new());
            lines.push("```html".to_string());
            lines.push(analysis.improved_description.clone());
            lines.push("```".to_string());
        }

        lines.join("\n")
    }
}

fn display_price(snapshot: &ListingSnapshot) -> String {
    snapshot
        .price_display
        .clone()
        .or_else(|| snapshot.formatted_amount())
        .unwrap_or_else(|| NA.to_string())
}

/// Renders a 0-5 rating as five stars, rounding to the nearest whole star.
fn stars(rating: f64) -> String {
    let filled = rating.clamp(0.0, 5.0).round() as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn metric_rows(ours: &ListingMetrics, theirs: &ListingMetrics) -> Vec<(&'static str, String, String)> {
    let price = |m: &ListingMetrics| m.price.map_or_else(|| NA.to_string(), |p| format!("{:.2}", p));
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NA.to_string());

    vec![
        ("Price", price(ours), price(theirs)),
        ("Delivery", text(&ours.delivery_time), text(&theirs.delivery_time)),
        ("Shipping", text(&ours.shipping_cost), text(&theirs.shipping_cost)),
        (
            "Description",
            format!("{}/10", ours.description_quality),
            format!("{}/10", theirs.description_quality),
        ),
        ("Photos", ours.photos_count.to_string(), theirs.photos_count.to_string()),
    ]
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
