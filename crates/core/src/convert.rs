//! Type conversion interface
//!
//! Converting field text to typed values (and back) is a collaborator of the
//! mapping engine, not part of it. A property map may carry its own
//! [`TypeConverter`]; otherwise the ambient [`DefaultConverter`] is used.

use crate::error::{Error, Result};
use crate::record::RowContext;
use crate::shape::ScalarKind;
use crate::value::Value;

/// Converts between field text and [`Value`]s
pub trait TypeConverter: Send + Sync {
    /// Convert field text to a value of the target kind
    ///
    /// `target` is `None` for untyped members, which receive text unchanged
    /// by the default converter.
    fn convert_from_string(
        &self,
        text: &str,
        target: Option<ScalarKind>,
        row: RowContext,
    ) -> Result<Value>;

    /// Convert a value to field text
    fn convert_to_string(&self, value: &Value, row: RowContext) -> Result<String>;
}

/// The ambient converter for the built-in scalar kinds
///
/// Numbers and booleans are trimmed before parsing. Booleans accept
/// `true`/`false` in any case and `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl TypeConverter for DefaultConverter {
    fn convert_from_string(
        &self,
        text: &str,
        target: Option<ScalarKind>,
        row: RowContext,
    ) -> Result<Value> {
        let fail = |kind: ScalarKind| Error::Conversion {
            text: text.to_string(),
            target: kind.to_string(),
            row: row.row,
        };

        match target {
            None | Some(ScalarKind::String) => Ok(Value::String(text.to_string())),
            Some(ScalarKind::Int) => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| fail(ScalarKind::Int)),
            Some(ScalarKind::Float) => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| fail(ScalarKind::Float)),
            Some(ScalarKind::Bool) => {
                let t = text.trim();
                if t.eq_ignore_ascii_case("true") || t == "1" {
                    Ok(Value::Bool(true))
                } else if t.eq_ignore_ascii_case("false") || t == "0" {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail(ScalarKind::Bool))
                }
            }
        }
    }

    fn convert_to_string(&self, value: &Value, row: RowContext) -> Result<String> {
        match value {
            Value::Object(o) => Err(Error::Conversion {
                text: o.type_name().to_string(),
                target: "String".to_string(),
                row: row.row,
            }),
            other => Ok(other.to_string()),
        }
    }
}
