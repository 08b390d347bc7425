mod format;
mod metrics;

pub use format::{format_compact, format_currency, format_grouped_int, format_number, format_percent};
pub use metrics::{
    concentration_tone, days_until, debt_risk_ratio, debt_risk_tone, expiry_risk_tone,
    expiry_urgency, ratio, unit_vacancy_tone, vacancy_rate_by_area, vacancy_rate_by_units,
    walt_tone, ExpiryUrgency, Tone,
};
