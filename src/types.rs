use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A candidate wallet transaction submitted for analysis.
/// Not persisted by this service; it only exists for the duration of a check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub direction: TxDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Send,
    Receive,
}

impl TxDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
        }
    }
}

/// Clamp an amount to something the scoring math can handle.
/// Negative and non-finite values count as zero rather than erroring out.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        0.0
    }
}

/// Accepts a JSON number, a numeric string, or nothing at all.
/// Anything that doesn't parse as a number becomes 0.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_amount() {
        let tx: Transaction = serde_json::from_str(
            r#"{"amount": 0.25, "timestamp": "2024-05-01T12:30:00Z", "type": "send"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, 0.25);
        assert_eq!(tx.direction, TxDirection::Send);
    }

    #[test]
    fn parse_string_amount() {
        let tx: Transaction = serde_json::from_str(
            r#"{"amount": "1.5", "timestamp": "2024-05-01T12:30:00Z", "type": "receive"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, 1.5);
    }

    #[test]
    fn non_numeric_amount_becomes_zero() {
        let tx: Transaction = serde_json::from_str(
            r#"{"amount": "lots", "timestamp": "2024-05-01T12:30:00Z", "type": "send"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, 0.0);
    }

    #[test]
    fn missing_amount_becomes_zero() {
        let tx: Transaction = serde_json::from_str(
            r#"{"timestamp": "2024-05-01T12:30:00Z", "type": "send"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, 0.0);
    }

    #[test]
    fn sanitize_rejects_negative_and_nan() {
        assert_eq!(sanitize_amount(-4.0), 0.0);
        assert_eq!(sanitize_amount(f64::NAN), 0.0);
        assert_eq!(sanitize_amount(f64::INFINITY), 0.0);
        assert_eq!(sanitize_amount(2.5), 2.5);
    }
}
