//! Evaluator result values and display coercion.

use std::fmt;

use futures::future::BoxFuture;

/// A raw value produced by a template evaluation.
///
/// Mirrors the value space of the external script evaluator: plain scalars,
/// structured data, an absent result, or a result that settles later.
pub enum TemplateValue {
    /// No result was produced.
    Undefined,
    /// Boolean result.
    Bool(bool),
    /// Numeric result; may be NaN.
    Number(f64),
    /// Textual result.
    Text(String),
    /// Structured result, rendered as compact JSON text.
    Data(serde_json::Value),
    /// A result that settles later; coercion awaits it.
    Pending(BoxFuture<'static, TemplateValue>),
}

impl fmt::Debug for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Bool(flag) => f.debug_tuple("Bool").field(flag).finish(),
            Self::Number(number) => f.debug_tuple("Number").field(number).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl From<serde_json::Value> for TemplateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Undefined,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => {
                Self::Number(number.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Data(other),
        }
    }
}

/// Coerce a raw evaluation result into its display string.
///
/// Pending values are awaited and the settled value is coerced in their
/// place, however deeply nested.
pub async fn to_display(value: TemplateValue) -> String {
    let mut value = value;
    loop {
        match value {
            TemplateValue::Pending(inner) => value = inner.await,
            TemplateValue::Undefined => return String::new(),
            TemplateValue::Bool(flag) => return flag.to_string(),
            TemplateValue::Number(number) => return render_number(number),
            TemplateValue::Text(text) => return text.trim().to_string(),
            TemplateValue::Data(data) => {
                return serde_json::to_string(&data).unwrap_or_default();
            }
        }
    }
}

/// Render a number the way the host displays it: integral values without a
/// fractional part, NaN as the empty string.
pub(crate) fn render_number(number: f64) -> String {
    if number.is_nan() {
        return String::new();
    }
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 {
        return format!("{}", number as i64);
    }
    number.to_string()
}
