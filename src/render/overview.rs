use chrono::{DateTime, Datelike, Utc};
use colored::{Color, Colorize};
use tabled::{settings::Style, Table, Tabled};

use super::{render_bar_chart, render_cards, render_filter_bar, Bar, KpiCard};
use crate::filter::FilterState;
use crate::gateway::{OverviewData, Page, UpcomingExpiry};
use crate::present::{
    concentration_tone, expiry_risk_tone, expiry_urgency, format_currency, format_number,
    format_percent, unit_vacancy_tone, vacancy_rate_by_area, vacancy_rate_by_units, walt_tone,
    Tone,
};

#[derive(Tabled)]
struct ExpiryRow {
    #[tabled(rename = "")]
    initials: String,
    #[tabled(rename = "TENANT")]
    tenant: String,
    #[tabled(rename = "LOCATION")]
    location: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "ANNUAL RENT")]
    rent: String,
    #[tabled(rename = "END DATE")]
    end_date: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn initials(tenant: Option<&str>) -> String {
    match tenant {
        Some(name) if !name.is_empty() => name.chars().take(2).collect::<String>().to_uppercase(),
        _ => "??".to_string(),
    }
}

fn expiry_row(item: &UpcomingExpiry, now: DateTime<Utc>) -> ExpiryRow {
    let end_date = item.next_possible_contract_end.clone().unwrap_or_default();
    ExpiryRow {
        initials: initials(item.tenant.as_deref()),
        tenant: item.tenant.clone().unwrap_or_else(|| "Unknown".to_string()),
        location: item
            .city
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "—".to_string()),
        unit: item.unit_id.clone().unwrap_or_default(),
        rent: format_currency(item.net_rent_year),
        status: expiry_urgency(&end_date, now).label().to_string(),
        end_date,
    }
}

fn overview_cards(data: &OverviewData) -> Vec<KpiCard> {
    let m = &data.metrics;
    let k = &data.marketing;
    let unit_vacancy = vacancy_rate_by_units(m);

    vec![
        KpiCard::new(
            "Net Rent / Month",
            format_currency(m.net_rent_month),
            format!("{} / year", format_currency(m.net_rent_year)),
        )
        .tone(Tone::Primary),
        KpiCard::new(
            "Unit Vacancy",
            format_percent(unit_vacancy),
            format!("{} vacant units", format_number(m.vacant_units_count)),
        )
        .detail(format!("GLA vacancy: {}", format_percent(vacancy_rate_by_area(m))))
        .tone(unit_vacancy_tone(unit_vacancy)),
        KpiCard::new(
            "WALT",
            format!("{} yrs", format_number(m.walt_weighted_years)),
            "Weighted avg. lease term",
        )
        .tone(walt_tone(m.walt_weighted_years)),
        KpiCard::new(
            "WA Rent",
            format!("€{}/m²", format_number(m.wa_rent_eur_m2_month)),
            "Per m² per month",
        ),
        KpiCard::new(
            "Lettable Area",
            format!("{} m²", format_number(m.area_m2)),
            format!("{} m² vacant", format_number(m.vacant_area_m2)),
        ),
        KpiCard::new(
            "Top-5 Concentration",
            format_percent(k.top5_concentration),
            "Share of annual rent",
        )
        .tone(concentration_tone(k.top5_concentration)),
        KpiCard::new(
            "12m Expiry Risk",
            format_currency(k.expiry_12m_net_rent_year),
            "Rent expiring within 12 months",
        )
        .tone(expiry_risk_tone(k.expiry_12m_net_rent_year)),
        KpiCard::new(
            "Indexation",
            format_percent(k.indexable_rent_share),
            "Indexable rent share",
        ),
    ]
}

fn tenant_bars(data: &OverviewData) -> Vec<Bar> {
    data.top_tenants
        .iter()
        .map(|t| Bar {
            label: t
                .tenant
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            value: t.net_rent_year,
            color: Color::Blue,
        })
        .collect()
}

/// Years up to next year are flagged as near-term exposure
fn expiry_bars(data: &OverviewData, current_year: i32) -> Vec<Bar> {
    data.expiry
        .iter()
        .map(|e| {
            let year = e.expiry_year.round() as i32;
            Bar {
                label: year.to_string(),
                value: e.net_rent_year,
                color: if year <= current_year + 1 {
                    Color::Red
                } else {
                    Color::Blue
                },
            }
        })
        .collect()
}

fn upcoming_section(data: &OverviewData, now: DateTime<Utc>) -> String {
    let count = data.upcoming.len();
    let mut out = format!(
        "{}  {}\n",
        "Upcoming Expiries (90 Days)".bold(),
        format!("{count} Actions").dimmed()
    );
    if data.upcoming.is_empty() {
        out.push_str("  All Clear: no leases expire in the next 90 days.\n");
        return out;
    }

    let rows: Vec<ExpiryRow> = data.upcoming.iter().map(|u| expiry_row(u, now)).collect();
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push('\n');
    out
}

/// Full overview page as terminal text
pub fn render_overview(data: &OverviewData, filters: &FilterState, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Portfolio Overview".bold()));
    out.push_str(&format!(
        "Operational KPIs · {} Units · {} Active Tenants · Total Annual Rent: {}\n\n",
        format_number(data.marketing.units_count),
        format_number(data.marketing.tenants_count),
        format_currency(data.metrics.net_rent_year)
    ));
    out.push_str(&render_filter_bar(filters, &data.options, Page::Overview));
    out.push('\n');

    out.push_str(&render_cards(&overview_cards(data)));
    out.push('\n');

    out.push_str(&render_bar_chart(
        "Top Tenants Exposure",
        "Ranked by net annual rent",
        &tenant_bars(data),
        "€",
    ));
    out.push('\n');
    out.push_str(&render_bar_chart(
        "Lease Expiry Profile",
        "Net rent expiring per year",
        &expiry_bars(data, now.year()),
        "€",
    ));
    out.push('\n');

    out.push_str(&upcoming_section(data, now));
    out
}
