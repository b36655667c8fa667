use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! text_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

text_newtype!(FiscalYear);
text_newtype!(ClientId);

/// Correlation token for a single remote call.
///
/// Sent as the `callback` query parameter; a wrapped reply must echo it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn callback_name(&self) -> String {
        format!("insights_{}", self.0.simple())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub vat_returns: f64,
    pub sales: f64,
    pub purchases: f64,
    pub status: String,
}

impl ClientRecord {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }
}

pub const COMPLETED_STATUS: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCard {
    pub id: u8,
    pub title: String,
    pub value: String,
    pub icon: String,
    pub description: String,
}

/// One fiscal year's rows as returned by the remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearData {
    pub clients: Vec<ClientRecord>,
    /// Year echoed by the server; authoritative for display.
    pub fiscal_year: FiscalYear,
    pub available_years: Vec<FiscalYear>,
}

/// Keyed view over a load. Clients sharing a normalized name collapse to the last one.
pub fn index_by_id(clients: &[ClientRecord]) -> HashMap<&ClientId, &ClientRecord> {
    clients.iter().map(|client| (&client.id, client)).collect()
}
