use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::batch::{gather, RpcCall};
use super::client::RpcTransport;
use super::{filter_params, Page};
use crate::error::Result;
use crate::filter::{FilterOptions, FilterState};

/// The options procedure answers with either shape; only the head of a list counts
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionsPayload {
    Wrapped(Vec<Value>),
    Bare(RawOptions),
}

#[derive(Deserialize, Default)]
struct RawOptions {
    #[serde(default, deserialize_with = "string_list")]
    fund: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    entity: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    country: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    city: Vec<String>,
}

impl From<RawOptions> for FilterOptions {
    fn from(raw: RawOptions) -> Self {
        FilterOptions {
            fund: raw.fund,
            entity: raw.entity,
            country: raw.country,
            city: raw.city,
        }
    }
}

/// Anything but a sequence is empty; non-string entries are dropped
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Normalize an options response to one record
pub fn decode_options(endpoint: &str, value: Value) -> FilterOptions {
    if value.is_null() {
        return FilterOptions::default();
    }
    let head = match serde_json::from_value::<OptionsPayload>(value) {
        Ok(OptionsPayload::Bare(raw)) => return raw.into(),
        Ok(OptionsPayload::Wrapped(records)) => match records.into_iter().next() {
            Some(head) => serde_json::from_value::<RawOptions>(head),
            None => return FilterOptions::default(),
        },
        Err(err) => Err(err),
    };
    match head {
        Ok(raw) => raw.into(),
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "unrecognized filter options payload");
            FilterOptions::default()
        }
    }
}

/// Fetch only the filter choices of a page
pub fn load_options<T>(transport: &T, filters: &FilterState, page: Page) -> Result<FilterOptions>
where
    T: RpcTransport + ?Sized,
{
    let endpoint = page.options_endpoint();
    let calls = [RpcCall::new(endpoint, &filter_params(filters, page))];
    let value = gather(transport, &calls)?
        .into_iter()
        .next()
        .unwrap_or(Value::Null);
    Ok(decode_options(endpoint, value))
}
