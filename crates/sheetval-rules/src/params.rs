//! Typed access to untyped rule parameters.
//!
//! Numbers may be written as JSON numbers or numeric strings, flags as JSON
//! booleans or `"true"`/`"false"`, lists as arrays or comma-separated text.
//! `null` reads as absent everywhere.

use serde_json::Value;

use crate::document::Params;
use crate::error::{Result, RuleError};

/// Textual form of a scalar parameter value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number
            .as_f64()
            .filter(|float| float.fract() == 0.0 && float.abs() < 1e15)
            .map_or_else(|| number.to_string(), |float| format!("{}", float as i64)),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Reads parameters of one rule, reporting failures against that rule.
pub(crate) struct ParamReader<'a> {
    rule_id: &'a str,
    kind: &'a str,
    params: &'a Params,
}

impl<'a> ParamReader<'a> {
    pub(crate) fn new(rule_id: &'a str, kind: &'a str, params: &'a Params) -> Self {
        Self {
            rule_id,
            kind,
            params,
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.params.get(key).filter(|value| !value.is_null())
    }

    fn invalid(&self, param: &'static str, reason: impl Into<String>) -> RuleError {
        RuleError::InvalidParam {
            rule_id: self.rule_id.to_string(),
            kind: self.kind.to_string(),
            param,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(&self, param: &'static str) -> RuleError {
        RuleError::MissingParam {
            rule_id: self.rule_id.to_string(),
            kind: self.kind.to_string(),
            param,
        }
    }

    pub(crate) fn f64(&self, key: &'static str) -> Result<Option<f64>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let number = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) if text.trim().is_empty() => return Ok(None),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(number) if !number.is_nan() => Ok(Some(number)),
            _ => Err(self.invalid(key, format!("expected a number, found {value}"))),
        }
    }

    pub(crate) fn f64_or(&self, key: &'static str, default: f64) -> Result<f64> {
        Ok(self.f64(key)?.unwrap_or(default))
    }

    /// Non-negative tolerance.
    pub(crate) fn tolerance(&self, key: &'static str, default: f64) -> Result<f64> {
        let tolerance = self.f64_or(key, default)?;
        if tolerance < 0.0 {
            return Err(self.invalid(key, "must not be negative"));
        }
        Ok(tolerance)
    }

    pub(crate) fn i64(&self, key: &'static str) -> Result<Option<i64>> {
        match self.f64(key)? {
            None => Ok(None),
            Some(number) if number.fract() == 0.0 && number.is_finite() => {
                Ok(Some(number as i64))
            }
            Some(number) => Err(self.invalid(key, format!("expected a whole number, found {number}"))),
        }
    }

    pub(crate) fn usize(&self, key: &'static str) -> Result<Option<usize>> {
        match self.i64(key)? {
            None => Ok(None),
            Some(number) => usize::try_from(number)
                .map(Some)
                .map_err(|_| self.invalid(key, "must not be negative")),
        }
    }

    pub(crate) fn bool_or(&self, key: &'static str, default: bool) -> Result<bool> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value {
            Value::Bool(flag) => Ok(*flag),
            Value::String(text) => match text.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(self.invalid(key, format!("expected a boolean, found {value}"))),
            },
            _ => Err(self.invalid(key, format!("expected a boolean, found {value}"))),
        }
    }

    /// First flag present among `keys`.
    pub(crate) fn bool_any(&self, keys: &[&'static str], default: bool) -> Result<bool> {
        for key in keys {
            if self.get(key).is_some() {
                return self.bool_or(key, default);
            }
        }
        Ok(default)
    }

    /// Scalar parameter as text; empty text reads as absent.
    pub(crate) fn text(&self, key: &'static str) -> Option<String> {
        self.get(key)
            .map(value_text)
            .filter(|text| !text.trim().is_empty())
    }

    /// Scalar parameter as text, keeping empty text.
    pub(crate) fn raw_text(&self, key: &'static str) -> Option<String> {
        self.get(key).map(value_text)
    }

    pub(crate) fn list(&self, key: &'static str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Array(items) => Ok(Some(items.iter().map(value_text).collect())),
            Value::String(text) => Ok(Some(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            _ => Err(self.invalid(key, format!("expected a list, found {value}"))),
        }
    }

    pub(crate) fn model_error(&self, source: sheetval_model::ModelError) -> RuleError {
        RuleError::Model {
            rule_id: self.rule_id.to_string(),
            source,
        }
    }

    pub(crate) fn range_error(&self, param: &'static str, min: f64, max: f64) -> RuleError {
        self.invalid(param, format!("minimum {min} is greater than maximum {max}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => Params::new(),
        }
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let map = params(json!({"a": 5, "b": "2.5", "c": "", "d": "x", "e": null}));
        let reader = ParamReader::new("r", "Length", &map);
        assert_eq!(reader.f64("a").unwrap(), Some(5.0));
        assert_eq!(reader.f64("b").unwrap(), Some(2.5));
        assert_eq!(reader.f64("c").unwrap(), None);
        assert!(reader.f64("d").is_err());
        assert_eq!(reader.f64("e").unwrap(), None);
        assert_eq!(reader.f64("missing").unwrap(), None);
    }

    #[test]
    fn usize_rejects_negative_and_fractional() {
        let map = params(json!({"neg": -1, "frac": 1.5, "ok": 3.0}));
        let reader = ParamReader::new("r", "Length", &map);
        assert!(reader.usize("neg").is_err());
        assert!(reader.usize("frac").is_err());
        assert_eq!(reader.usize("ok").unwrap(), Some(3));
    }

    #[test]
    fn lists_accept_arrays_and_comma_text() {
        let map = params(json!({"a": ["x", 1, true], "b": "a, b ,,c"}));
        let reader = ParamReader::new("r", "Choice", &map);
        assert_eq!(
            reader.list("a").unwrap(),
            Some(vec!["x".to_string(), "1".to_string(), "true".to_string()])
        );
        assert_eq!(
            reader.list("b").unwrap(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn value_text_renders_whole_numbers_without_fraction() {
        assert_eq!(value_text(&json!(1000)), "1000");
        assert_eq!(value_text(&json!(1000.0)), "1000");
        assert_eq!(value_text(&json!(2.5)), "2.5");
        assert_eq!(value_text(&json!("VIP")), "VIP");
        assert_eq!(value_text(&Value::Null), "");
    }
}
