//! Derived ratios and the thresholds that pick a KPI's display tone.

use chrono::{DateTime, NaiveDate, Utc};

use crate::gateway::{DebtMetrics, PortfolioMetrics};

/// `part / whole`, or 0 when there is nothing to divide by
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Vacant share of lettable area
pub fn vacancy_rate_by_area(metrics: &PortfolioMetrics) -> f64 {
    ratio(metrics.vacant_area_m2, metrics.area_m2)
}

/// Vacant share of units
pub fn vacancy_rate_by_units(metrics: &PortfolioMetrics) -> f64 {
    ratio(metrics.vacant_units_count, metrics.row_count)
}

/// Share of outstanding debt older than 90 days
pub fn debt_risk_ratio(metrics: &DebtMetrics) -> f64 {
    ratio(metrics.risk_debt_90_plus, metrics.total_debt)
}

/// Visual emphasis of a KPI card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Default,
    Primary,
    Warning,
    Danger,
}

pub fn unit_vacancy_tone(rate: f64) -> Tone {
    if rate > 0.10 {
        Tone::Danger
    } else {
        Tone::Default
    }
}

pub fn walt_tone(years: f64) -> Tone {
    if years < 3.0 {
        Tone::Warning
    } else {
        Tone::Default
    }
}

pub fn concentration_tone(top5_share: f64) -> Tone {
    if top5_share > 0.5 {
        Tone::Warning
    } else {
        Tone::Default
    }
}

pub fn expiry_risk_tone(rent_expiring_12m: f64) -> Tone {
    if rent_expiring_12m > 0.0 {
        Tone::Danger
    } else {
        Tone::Default
    }
}

pub fn debt_risk_tone(risk_ratio: f64) -> Tone {
    if risk_ratio > 0.15 {
        Tone::Danger
    } else if risk_ratio > 0.05 {
        Tone::Warning
    } else {
        Tone::Default
    }
}

/// How close a lease end is; selects the badge colour only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUrgency {
    /// Fewer than 30 days left
    Imminent,
    /// Fewer than 60 days left
    Soon,
    Upcoming,
}

impl ExpiryUrgency {
    pub fn from_days(days: i64) -> Self {
        if days < 30 {
            ExpiryUrgency::Imminent
        } else if days < 60 {
            ExpiryUrgency::Soon
        } else {
            ExpiryUrgency::Upcoming
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpiryUrgency::Imminent => "< 30 days",
            ExpiryUrgency::Soon => "< 60 days",
            ExpiryUrgency::Upcoming => "Expiring",
        }
    }
}

/// Whole days from `now` until the start (UTC midnight) of `date`, rounded up
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let target = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let millis = (target - now).num_milliseconds();
    (millis as f64 / 86_400_000.0).ceil() as i64
}

/// Urgency of an ISO `YYYY-MM-DD` end date; unparseable dates get the default tier
pub fn expiry_urgency(date: &str, now: DateTime<Utc>) -> ExpiryUrgency {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(date) => ExpiryUrgency::from_days(days_until(date, now)),
        Err(_) => ExpiryUrgency::Upcoming,
    }
}
