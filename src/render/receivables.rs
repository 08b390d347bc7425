use colored::{Color, Colorize};
use tabled::{settings::Style, Table, Tabled};

use super::{render_bar_chart, render_cards, render_filter_bar, Bar, KpiCard};
use crate::arrears::{ArrearsTable, ArrearsView, GroupSummary};
use crate::filter::FilterState;
use crate::gateway::{Page, ReceivableRow, ReceivablesData};
use crate::present::{
    debt_risk_ratio, debt_risk_tone, format_currency, format_number, format_percent, Tone,
};

#[derive(Tabled)]
struct GroupLine {
    #[tabled(rename = "DEBTOR GROUP")]
    debtor: String,
    #[tabled(rename = "OPEN ITEMS")]
    items: String,
    #[tabled(rename = "1-30 DAYS")]
    days_1_30: String,
    #[tabled(rename = "31-60 DAYS")]
    days_31_60: String,
    #[tabled(rename = "61-90 DAYS")]
    days_61_90: String,
    #[tabled(rename = "> 90 DAYS (RISK)")]
    risk: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct InvoiceLine {
    #[tabled(rename = "TENANT")]
    tenant: String,
    #[tabled(rename = "UNIT / INVOICE")]
    unit: String,
    #[tabled(rename = "1-30 DAYS")]
    days_1_30: String,
    #[tabled(rename = "31-60 DAYS")]
    days_31_60: String,
    #[tabled(rename = "61-90 DAYS")]
    days_61_90: String,
    #[tabled(rename = "> 90 DAYS (RISK)")]
    risk: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

/// Zero buckets render as a dash
fn bucket_cell(amount: f64) -> String {
    if amount == 0.0 {
        "-".to_string()
    } else {
        format_currency(amount)
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("1 {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn group_line(group: &GroupSummary) -> GroupLine {
    let mut debtor = if group.display_name.is_empty() {
        "Unknown".to_string()
    } else {
        group.display_name.clone()
    };
    if !group.city.is_empty() {
        debtor.push_str(&format!("\n{} (HQ)", group.city));
    }

    GroupLine {
        debtor,
        items: plural(group.count, "Invoice"),
        days_1_30: bucket_cell(group.bucket_1_30),
        days_31_60: bucket_cell(group.bucket_31_60),
        days_61_90: bucket_cell(group.bucket_61_90),
        risk: bucket_cell(group.risk_amount()),
        total: format_currency(group.total),
    }
}

fn invoice_line(row: &ReceivableRow) -> InvoiceLine {
    let tenant_name = row.tenant.clone().unwrap_or_default();
    let mut tenant = tenant_name.clone();
    if let Some(contact) = row.contact_name.as_deref() {
        if !contact.is_empty() && contact != tenant_name {
            tenant.push_str(&format!("\nGroup: {contact}"));
        }
    }
    if let Some(city) = row.city.as_deref().filter(|c| !c.is_empty()) {
        tenant.push_str(&format!("\n{city}"));
    }

    let mut unit = row.unit_id.clone().unwrap_or_default();
    if let Some(date) = row.invoice_date.as_deref() {
        unit.push_str(&format!("\n{date}"));
    }

    InvoiceLine {
        tenant,
        unit,
        days_1_30: bucket_cell(row.bucket_1_30),
        days_31_60: bucket_cell(row.bucket_31_60),
        days_61_90: bucket_cell(row.bucket_61_90),
        risk: bucket_cell(row.risk_amount()),
        total: format_currency(row.total),
    }
}

fn arrears_section(table: &ArrearsTable) -> String {
    let view = table.view();
    let caption = match view {
        ArrearsView::Groups(_) => "Consolidated view by debtor group",
        ArrearsView::Lines(_) => "Line items per invoice",
    };
    let mut out = format!("{}  {}\n", "Arrears Details".bold(), caption.dimmed());

    if view.is_empty() {
        out.push_str("  No open receivables found.\n");
        return out;
    }

    let rendered = match view {
        ArrearsView::Groups(groups) => {
            Table::new(groups.iter().map(group_line)).with(Style::rounded()).to_string()
        }
        ArrearsView::Lines(rows) => {
            Table::new(rows.iter().map(invoice_line)).with(Style::rounded()).to_string()
        }
    };
    out.push_str(&rendered);
    out.push('\n');
    out
}

fn receivables_cards(data: &ReceivablesData) -> Vec<KpiCard> {
    let m = &data.metrics;
    let risk_ratio = debt_risk_ratio(m);

    vec![
        KpiCard::new(
            "Total Outstanding",
            format_currency(m.total_debt),
            format!("{} open invoices", format_number(m.row_count)),
        )
        .tone(Tone::Primary),
        KpiCard::new(
            "Severe Risk (> 90d)",
            format_currency(m.risk_debt_90_plus),
            format!("{} of total debt", format_percent(risk_ratio)),
        )
        .tone(debt_risk_tone(risk_ratio)),
        KpiCard::new(
            "Fresh Debt (< 30d)",
            format_currency(m.fresh_debt_30),
            "Recently invoiced",
        ),
        KpiCard::new(
            "Top Group Exposure",
            format_currency(m.max_single_tenant_debt),
            "Largest single debtor",
        ),
    ]
}

/// Older buckets escalate from green to amber to red
fn aging_color(index: usize) -> Color {
    match index {
        0 | 1 => Color::Green,
        2 => Color::Yellow,
        _ => Color::Red,
    }
}

fn aging_bars(data: &ReceivablesData) -> Vec<Bar> {
    data.aging
        .iter()
        .enumerate()
        .map(|(i, b)| Bar {
            label: b.bucket.clone().unwrap_or_default(),
            value: b.amount,
            color: aging_color(i),
        })
        .collect()
}

fn debtor_bars(data: &ReceivablesData) -> Vec<Bar> {
    data.top_debtors
        .iter()
        .map(|d| Bar {
            label: d
                .tenant
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            value: d.total_debt,
            color: Color::Blue,
        })
        .collect()
}

/// Full receivables page as terminal text
pub fn render_receivables(
    data: &ReceivablesData,
    table: &ArrearsTable,
    filters: &FilterState,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Receivables & Collection".bold()));
    out.push_str(&format!(
        "Consolidated arrears overview · {} Open Invoices · Total Outstanding: {}\n\n",
        format_number(data.metrics.row_count),
        format_currency(data.metrics.total_debt)
    ));
    out.push_str(&render_filter_bar(filters, &data.options, Page::Receivables));
    out.push('\n');

    out.push_str(&render_cards(&receivables_cards(data)));
    out.push('\n');

    out.push_str(&render_bar_chart(
        "Aged Debt Profile",
        "Outstanding amount per aging bucket",
        &aging_bars(data),
        "€",
    ));
    out.push('\n');
    out.push_str(&render_bar_chart(
        "Top Debtor Groups",
        "Ranked by outstanding debt",
        &debtor_bars(data),
        "€",
    ));
    out.push('\n');

    out.push_str(&arrears_section(table));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrears::ViewMode;
    use crate::gateway::{AgingBucket, DebtMetrics, Debtor};

    fn line(tenant: &str, contact: Option<&str>, city: &str, b1: f64, b120: f64) -> ReceivableRow {
        ReceivableRow {
            tenant: Some(tenant.to_string()),
            contact_name: contact.map(str::to_string),
            unit_id: Some(format!("U-{tenant}")),
            city: Some(city.to_string()),
            invoice_date: Some("2026-08-01".to_string()),
            bucket_1_30: b1,
            bucket_120_plus: b120,
            total: b1 + b120,
            ..Default::default()
        }
    }

    fn sample() -> ReceivablesData {
        ReceivablesData {
            metrics: DebtMetrics {
                total_debt: 10_000.0,
                risk_debt_90_plus: 2_000.0,
                fresh_debt_30: 3_000.0,
                row_count: 3.0,
                max_single_tenant_debt: 6_000.0,
            },
            aging: ["0-30", "31-60", "61-90", "90+"]
                .iter()
                .map(|b| AgingBucket {
                    bucket: Some(b.to_string()),
                    amount: 1_000.0,
                })
                .collect(),
            top_debtors: vec![Debtor {
                tenant: Some("Retail Co".to_string()),
                total_debt: 6_000.0,
            }],
            rows: vec![
                line("Shop A", Some("Retail Co"), "Paris", 1_000.0, 2_000.0),
                line("Shop B", Some("Retail Co"), "Lyon", 3_000.0, 0.0),
                line("Bakery", None, "Nice", 500.0, 0.0),
            ],
            options: Default::default(),
        }
    }

    #[test]
    fn group_view_consolidates_debtors() {
        colored::control::set_override(false);
        let data = sample();
        let table = ArrearsTable::new(data.rows.clone(), ViewMode::Grouped);
        let page = render_receivables(&data, &table, &FilterState::default());

        assert!(page.contains("3 Open Invoices · Total Outstanding: €10,000"));
        assert!(page.contains("20% of total debt"));
        assert!(page.contains("Consolidated view by debtor group"));
        assert!(page.contains("Paris (HQ)"));
        assert!(page.contains("2 Invoices"));
        assert!(page.contains("1 Invoice "));
        assert!(page.contains("€6,000"));
    }

    #[test]
    fn line_view_names_the_group_when_it_differs() {
        colored::control::set_override(false);
        let data = sample();
        let table = ArrearsTable::new(data.rows.clone(), ViewMode::Flat);
        let page = render_receivables(&data, &table, &FilterState::default());

        assert!(page.contains("Line items per invoice"));
        assert!(page.contains("Group: Retail Co"));
        assert!(!page.contains("Group: Bakery"));
        assert!(page.contains("U-Shop A"));
        assert!(page.contains("2026-08-01"));
    }

    #[test]
    fn empty_view_has_its_own_state() {
        colored::control::set_override(false);
        let data = ReceivablesData::default();
        let table = ArrearsTable::new(Vec::new(), ViewMode::Grouped);
        let page = render_receivables(&data, &table, &FilterState::default());
        assert!(page.contains("No open receivables found."));
    }

    #[test]
    fn zero_buckets_render_as_dashes() {
        let group = GroupSummary {
            display_name: "Bakery".to_string(),
            count: 1,
            bucket_1_30: 500.0,
            total: 500.0,
            ..Default::default()
        };
        let rendered = group_line(&group);
        assert_eq!(rendered.days_1_30, "€500");
        assert_eq!(rendered.days_31_60, "-");
        assert_eq!(rendered.risk, "-");
        assert_eq!(rendered.debtor, "Bakery");
    }

    #[test]
    fn aging_colors_escalate_with_bucket_age() {
        let colors: Vec<Color> = aging_bars(&sample()).iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![Color::Green, Color::Green, Color::Yellow, Color::Red]);
    }
}
