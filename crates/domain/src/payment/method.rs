use serde::{Deserialize, Serialize};

/// How a table paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the table.
    Efectivo,

    /// Paid at the bar counter.
    Barra,

    Online,
}

impl PaymentMethod {
    /// Methods in the order the cash register lists them.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Efectivo,
        PaymentMethod::Barra,
        PaymentMethod::Online,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Barra => "barra",
            PaymentMethod::Online => "online",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}
