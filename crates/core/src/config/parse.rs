//! Boundary conversion from loosely typed key/value input (form fields,
//! command line `key=value` pairs, hand-edited JSON) into [`VisualConfig`].

use serde_json::{Map, Number, Value};

use super::VisualConfig;
use crate::{BeatVizError, Result};

impl VisualConfig {
    /// Builds a configuration from defaults plus the given overrides.
    ///
    /// Keys that are unknown or whose values cannot be converted are skipped
    /// and returned alongside the configuration; every other key is applied.
    pub fn from_overrides(overrides: &Map<String, Value>) -> (Self, Vec<BeatVizError>) {
        let mut config = Self::default();
        let rejected = config.merge(overrides);
        (config, rejected)
    }

    /// Applies `overrides` on top of `self`, returning the rejected entries.
    pub fn merge(&mut self, overrides: &Map<String, Value>) -> Vec<BeatVizError> {
        let mut rejected = Vec::new();
        for (key, value) in overrides {
            if let Err(err) = self.apply_value(key, value.clone()) {
                tracing::warn!(%key, %err, "ignoring setting");
                rejected.push(err);
            }
        }
        rejected
    }

    /// Sets a single field from its textual form, e.g. `("lineCount", "12")`.
    pub fn apply_setting(&mut self, key: &str, raw: &str) -> Result<()> {
        self.apply_value(key, Value::String(raw.trim().to_string()))
    }

    /// Sets a single field from a JSON value, coercing strings and numbers
    /// into the field's type. On error `self` is left untouched.
    pub fn apply_value(&mut self, key: &str, value: Value) -> Result<()> {
        let Value::Object(mut fields) = serde_json::to_value(&*self)? else {
            return Err(BeatVizError::msg("configuration did not serialise to an object"));
        };

        let slot = fields
            .get_mut(key)
            .ok_or_else(|| BeatVizError::UnknownSetting(key.to_string()))?;
        let invalid = |value: &Value| BeatVizError::InvalidSetting {
            key: key.to_string(),
            value: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        };

        *slot = coerce(slot, &value).ok_or_else(|| invalid(&value))?;
        *self = serde_json::from_value(Value::Object(fields)).map_err(|_| invalid(&value))?;
        Ok(())
    }
}

/// Converts `value` into the JSON shape of `template`, or `None` when there is
/// no sensible conversion.
fn coerce(template: &Value, value: &Value) -> Option<Value> {
    match template {
        Value::Bool(_) => match value {
            Value::Bool(flag) => Some(Value::Bool(*flag)),
            Value::Number(n) => n.as_f64().map(|n| Value::Bool(n != 0.0)),
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Some(Value::Bool(true)),
                "false" | "off" | "no" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        Value::Number(slot) => {
            let number = match value {
                Value::Number(n) => n.as_f64()?,
                Value::String(text) => text.parse::<f64>().ok()?,
                _ => return None,
            };
            if !number.is_finite() {
                return None;
            }
            if slot.is_u64() {
                // counts: negative input means "none"
                Some(Value::Number(Number::from(number.max(0.0).round() as u64)))
            } else {
                Number::from_f64(number).map(Value::Number)
            }
        }
        Value::String(_) => match value {
            Value::String(text) => Some(Value::String(text.to_ascii_lowercase())),
            _ => None,
        },
        _ => None,
    }
}
