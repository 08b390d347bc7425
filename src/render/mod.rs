//! Text rendering of dashboard pages.

mod overview;
mod receivables;

pub use overview::render_overview;
pub use receivables::render_receivables;

use colored::{Color, Colorize};

use crate::error::DashboardError;
use crate::filter::{Dimension, FilterOptions, FilterState};
use crate::gateway::Page;
use crate::present::{format_compact, Tone};

const BAR_WIDTH: usize = 36;
const LABEL_WIDTH: usize = 30;

/// One KPI tile
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: Vec<String>,
    pub tone: Tone,
}

impl KpiCard {
    pub fn new(title: &'static str, value: String, subtitle: impl Into<String>) -> Self {
        Self {
            title,
            value,
            subtitle: vec![subtitle.into()],
            tone: Tone::Default,
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn detail(mut self, line: impl Into<String>) -> Self {
        self.subtitle.push(line.into());
        self
    }
}

fn paint(text: &str, tone: Tone) -> String {
    match tone {
        Tone::Default => text.bold().to_string(),
        Tone::Primary => text.cyan().bold().to_string(),
        Tone::Warning => text.yellow().bold().to_string(),
        Tone::Danger => text.red().bold().to_string(),
    }
}

pub fn render_cards(cards: &[KpiCard]) -> String {
    let mut out = String::new();
    for card in cards {
        out.push_str(&format!("  {:<24} {}\n", card.title, paint(&card.value, card.tone)));
        for line in &card.subtitle {
            out.push_str(&format!("  {:<24} {}\n", "", line.dimmed()));
        }
    }
    out
}

/// A labelled bar in a text chart
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

/// Horizontal bar chart; bar lengths are relative to the largest value
pub fn render_bar_chart(title: &str, subtitle: &str, bars: &[Bar], value_prefix: &str) -> String {
    let mut out = format!("{}  {}\n", title.bold(), subtitle.dimmed());
    if bars.is_empty() {
        out.push_str("  No data\n");
        return out;
    }

    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    for bar in bars {
        let len = if max > 0.0 && bar.value > 0.0 {
            ((bar.value / max) * BAR_WIDTH as f64).round().max(1.0) as usize
        } else {
            0
        };
        // padded separately: colored output ignores width specifiers
        out.push_str(&format!(
            "  {:<width$} {}{} {}{}\n",
            truncate_label(&bar.label),
            "█".repeat(len).color(bar.color),
            " ".repeat(BAR_WIDTH - len),
            value_prefix,
            format_compact(bar.value),
            width = LABEL_WIDTH,
        ));
    }
    out
}

/// Labels over 30 characters keep their first 24 plus an ellipsis
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > 30 {
        let head: String = label.chars().take(24).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Active selections and how many values the backend offers per dimension
pub fn render_filter_bar(filters: &FilterState, options: &FilterOptions, page: Page) -> String {
    let mut parts: Vec<String> = Dimension::ALL
        .iter()
        .filter_map(|d| {
            filters
                .selection(*d)
                .map(|values| format!("{}: {}", d.label(), values.join(", ")))
        })
        .collect();
    if let Some(search) = &filters.search {
        parts.push(format!("Search: \"{search}\""));
    }
    if filters.indexable_only && page == Page::Overview {
        parts.push("Indexable only".to_string());
    }

    let selection = if parts.is_empty() {
        "none".to_string()
    } else {
        format!("{}  ({} active)", parts.join(" · "), filters.active_count())
    };

    let available: Vec<String> = Dimension::ALL
        .iter()
        .map(|d| format!("{} {}", options.values(*d).len(), d.label().to_lowercase()))
        .collect();

    format!(
        "Filters: {}\nAvailable: {}\n",
        selection,
        available.join(", ").dimmed()
    )
}

/// The single page-level error state, naming the procedures that failed
pub fn render_error(page: Page, err: &DashboardError) -> String {
    let headline = match page {
        Page::Overview => "Error loading dashboard data. Please refresh.",
        Page::Receivables => "Error loading receivables data. Please refresh.",
    };
    let failed = err.failed_endpoints();
    if failed.is_empty() {
        format!("{}\n", headline.red().bold())
    } else {
        format!("{}\n  Failed: {}\n", headline.red().bold(), failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate_label("Short name"), "Short name");
        let long = "International Retail Holdings Europe SA";
        assert_eq!(truncate_label(long), "International Retail Hol...");
        let exactly_thirty = "a".repeat(30);
        assert_eq!(truncate_label(&exactly_thirty), exactly_thirty);
    }

    #[test]
    fn bar_chart_scales_to_largest_value() {
        plain();
        let bars = vec![
            Bar { label: "Big".to_string(), value: 2000.0, color: Color::Blue },
            Bar { label: "Half".to_string(), value: 1000.0, color: Color::Blue },
            Bar { label: "None".to_string(), value: 0.0, color: Color::Blue },
        ];
        let chart = render_bar_chart("Chart", "sub", &bars, "€");
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[3].matches('█').count(), 0);
        assert!(lines[1].ends_with("€2K"));
    }

    #[test]
    fn empty_chart_says_no_data() {
        plain();
        assert!(render_bar_chart("Chart", "sub", &[], "").contains("No data"));
    }

    #[test]
    fn filter_bar_lists_selection_and_counts() {
        plain();
        let filters = FilterState {
            fund: Some(vec!["Core".to_string(), "Value".to_string()]),
            search: Some("acme".to_string()),
            indexable_only: true,
            ..Default::default()
        };
        let options = FilterOptions {
            city: vec!["Paris".to_string(), "Lyon".to_string()],
            ..Default::default()
        };
        let bar = render_filter_bar(&filters, &options, Page::Overview);
        assert!(bar.contains("Fund: Core, Value · Search: \"acme\" · Indexable only  (3 active)"));
        assert!(bar.contains("2 city"));

        let receivables = render_filter_bar(&filters, &options, Page::Receivables);
        assert!(!receivables.contains("Indexable only"));
        assert!(render_filter_bar(&FilterState::default(), &options, Page::Overview)
            .starts_with("Filters: none"));
    }

    #[test]
    fn error_state_is_page_specific() {
        plain();
        let err = DashboardError::MissingBackendUrl;
        assert_eq!(
            render_error(Page::Overview, &err),
            "Error loading dashboard data. Please refresh.\n"
        );
        let err = DashboardError::WorkerPanicked("receivables_list".to_string());
        assert_eq!(
            render_error(Page::Receivables, &err),
            "Error loading receivables data. Please refresh.\n  Failed: receivables_list\n"
        );
    }
}
