use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{ClientRecord, FiscalYear},
    error::{RemoteError, INVALID_DATA_MESSAGE},
    normalize::{cell_text, client_name, derive_client_id, normalize_amount, normalize_status},
};

/// Reply to a request without a `year` parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearsResponse {
    #[serde(
        default,
        deserialize_with = "lenient_years",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_years: Option<Vec<FiscalYear>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl YearsResponse {
    pub fn failure_reason(&self) -> Option<&str> {
        non_empty(&self.error)
    }
}

/// Reply to a request carrying `year=<FiscalYear>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearDataResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub fiscal_year: Option<FiscalYear>,
    #[serde(
        default,
        deserialize_with = "lenient_years",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_years: Option<Vec<FiscalYear>>,
    /// Rows that are not JSON objects are skipped.
    #[serde(
        default,
        deserialize_with = "lenient_rows",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Vec<RawClientRow>>,
}

impl YearDataResponse {
    /// A reply fails when it carries an error or does not claim success.
    pub fn failure_reason(&self) -> Option<&str> {
        match non_empty(&self.error) {
            Some(reason) => Some(reason),
            None if !self.success => Some(INVALID_DATA_MESSAGE),
            None => None,
        }
    }
}

/// One spreadsheet row, cells kept as raw JSON until normalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClientRow {
    #[serde(rename = "Client", default)]
    pub client: Value,
    #[serde(rename = "VAT_Returns", default)]
    pub vat_returns: Value,
    #[serde(rename = "Sales", default)]
    pub sales: Value,
    #[serde(rename = "Purchases", default)]
    pub purchases: Value,
    #[serde(rename = "Status", default)]
    pub status: Value,
}

impl From<RawClientRow> for ClientRecord {
    fn from(row: RawClientRow) -> Self {
        let raw_name = cell_text(&row.client);
        Self {
            id: derive_client_id(raw_name.as_deref()),
            name: client_name(&row.client),
            vat_returns: normalize_amount(&row.vat_returns),
            sales: normalize_amount(&row.sales),
            purchases: normalize_amount(&row.purchases),
            status: normalize_status(&row.status),
        }
    }
}

/// Sheet cells holding a year may arrive as text or as a number.
fn year_from_cell(cell: &Value) -> Option<FiscalYear> {
    match cell {
        Value::String(_) | Value::Number(_) => cell_text(cell).map(FiscalYear::new),
        _ => None,
    }
}

fn lenient_year<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<FiscalYear>, D::Error> {
    Ok(year_from_cell(&Value::deserialize(deserializer)?))
}

fn lenient_years<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<FiscalYear>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(cells) => Some(cells.iter().filter_map(year_from_cell).collect()),
        _ => None,
    })
}

fn lenient_rows<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<RawClientRow>>, D::Error> {
    let Value::Array(rows) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        rows.into_iter()
            .filter(Value::is_object)
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect(),
    ))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

/// Returns the JSON document inside a reply.
///
/// Bare JSON passes through. A `name(...)` wrapped reply must be addressed to
/// `callback`, otherwise it belongs to a different call.
pub fn unwrap_reply<'a>(body: &'a str, callback: &str) -> Result<&'a str, RemoteError> {
    let body = body.trim();
    if body.starts_with('{') || body.starts_with('[') {
        return Ok(body);
    }

    let Some(open) = body.find('(') else {
        return Err(RemoteError::DataShape(
            "reply is neither JSON nor a callback invocation".to_string(),
        ));
    };
    let received = body[..open].trim().trim_start_matches("/**/").trim();
    if received != callback {
        return Err(RemoteError::Mismatch {
            expected: callback.to_string(),
            received: received.to_string(),
        });
    }

    body[open + 1..]
        .trim_end()
        .trim_end_matches(';')
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| RemoteError::DataShape("unterminated callback invocation".to_string()))
}

pub fn decode_reply<T: serde::de::DeserializeOwned>(
    body: &str,
    callback: &str,
) -> Result<T, RemoteError> {
    let json = unwrap_reply(body, callback)?;
    serde_json::from_str(json).map_err(|err| RemoteError::DataShape(err.to_string()))
}
