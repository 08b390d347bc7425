//! Display formatting in the dashboard's fixed locale (en-GB, EUR).

const CURRENCY_SYMBOL: &str = "€";

/// Group thousands with commas: 1234567 -> "1,234,567"
pub fn format_grouped_int(value: i64) -> String {
    let grouped = group_digits(value.unsigned_abs());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Grouped number with at most one fractional digit, trailing ".0" dropped
fn format_one_decimal(value: f64) -> String {
    let tenths = (value.abs() * 10.0).round() as i64;
    let whole = format_grouped_int(tenths / 10);
    let frac = tenths % 10;
    let sign = if value < 0.0 && tenths != 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{frac}")
    }
}

/// Whole euros: 1234.6 -> "€1,235", -50 -> "-€50"
///
/// Amounts beyond the `i64` range saturate at its bounds.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    format!(
        "{sign}{CURRENCY_SYMBOL}{}",
        group_digits(rounded.unsigned_abs())
    )
}

/// Ratio as a percentage: 0.1234 -> "12.3%", 0.1 -> "10%"
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", format_one_decimal(ratio * 100.0))
}

/// Plain grouped number: 1234.56 -> "1,234.6"
pub fn format_number(value: f64) -> String {
    format_one_decimal(value)
}

/// Short axis/tooltip label: 950 -> "950", 1234 -> "1.2K", 12345 -> "12K", 3.4e6 -> "3.4M"
pub fn format_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let mut unit_index = UNITS.iter().position(|(size, _)| abs >= *size);
    loop {
        let (size, suffix) = match unit_index {
            Some(i) => UNITS[i],
            None => (1.0, ""),
        };
        let scaled = abs / size;
        let text = if scaled < 10.0 {
            format_one_decimal(scaled)
        } else {
            format!("{}", scaled.round() as i64)
        };
        // 999_950 rounds to "1000K"; promote to the next unit instead
        if scaled.round() >= 1000.0 {
            match unit_index {
                Some(0) => {}
                Some(i) => {
                    unit_index = Some(i - 1);
                    continue;
                }
                None => {
                    unit_index = Some(UNITS.len() - 1);
                    continue;
                }
            }
        }
        return format!("{sign}{text}{suffix}");
    }
}
