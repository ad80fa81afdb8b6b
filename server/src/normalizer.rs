use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde_json::Value;

use crate::error::{Result, ServiceErr};

/// The field read from every record when `instances` is a list of objects.
pub const RECORD_FIELD: &str = "YearsExperience";

/// The accepted encodings of the `instances` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceShape {
    /// `[{"YearsExperience": 1.2}, ...]`, one single-feature sample per record.
    Records,
    /// `[1.2, 3.0, ...]`, one single-feature sample per number.
    Scalars,
    /// `[[1.2, 0.5], ...]`, one multi-feature sample per inner list.
    Rows,
}

impl InstanceShape {
    /// Classifies `items` by looking only at its first element.
    ///
    /// Records win over scalars, and anything else (including an empty list) is
    /// read as rows.
    pub fn detect(items: &[Value]) -> Self {
        match items.first() {
            Some(Value::Object(_)) => Self::Records,
            Some(Value::Array(_)) | None => Self::Rows,
            Some(_) => Self::Scalars,
        }
    }
}

/// Turns the JSON body of a prediction request into a `(samples, features)` matrix.
///
/// # Arguments
/// * `payload` - The whole request body.
///
/// # Returns
/// The sample matrix. An empty `instances` list yields a `(0, 1)` matrix.
///
/// # Errors
/// `MissingInstances` if there's no usable `instances` field, `InvalidInput` if any
/// value can't be read as a finite number or the rows have different lengths.
pub fn normalize(payload: &Value) -> Result<Array2<f64>> {
    let items = match payload.get("instances") {
        None | Some(Value::Null) => return Err(ServiceErr::MissingInstances),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ServiceErr::InvalidInput(format!(
                "expected a list, got {}",
                kind(other)
            )));
        }
    };

    let shape = InstanceShape::detect(items);
    debug!("normalizing {} instance(s) as {shape:?}", items.len());

    match shape {
        InstanceShape::Records => single_column(items, record_value),
        InstanceShape::Scalars => single_column(items, scalar_value),
        InstanceShape::Rows => rows(items),
    }
}

fn single_column<F>(items: &[Value], read: F) -> Result<Array2<f64>>
where
    F: Fn(usize, &Value) -> Result<f64>,
{
    let column = items
        .iter()
        .enumerate()
        .map(|(i, item)| read(i, item))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array1::from(column).insert_axis(Axis(1)))
}

fn record_value(i: usize, item: &Value) -> Result<f64> {
    let Value::Object(record) = item else {
        return Err(ServiceErr::InvalidInput(format!(
            "instance {i}: expected an object, got {}",
            kind(item)
        )));
    };

    let value = record.get(RECORD_FIELD).ok_or_else(|| {
        ServiceErr::InvalidInput(format!("instance {i}: missing field '{RECORD_FIELD}'"))
    })?;

    to_f64(value)
        .ok_or_else(|| ServiceErr::InvalidInput(format!("instance {i}: {}", not_a_number(value))))
}

fn scalar_value(i: usize, item: &Value) -> Result<f64> {
    to_f64(item)
        .ok_or_else(|| ServiceErr::InvalidInput(format!("instance {i}: {}", not_a_number(item))))
}

fn rows(items: &[Value]) -> Result<Array2<f64>> {
    let Some(first) = items.first() else {
        return Ok(Array2::zeros((0, 1)));
    };

    let width = match first {
        Value::Array(row) => row.len(),
        _ => 0,
    };

    if width == 0 {
        return Err(ServiceErr::InvalidInput(
            "row 0: expected a non-empty list of numbers".into(),
        ));
    }

    let mut flat = Vec::with_capacity(items.len() * width);
    for (i, item) in items.iter().enumerate() {
        let Value::Array(row) = item else {
            return Err(ServiceErr::InvalidInput(format!(
                "row {i}: expected a list, got {}",
                kind(item)
            )));
        };

        if row.len() != width {
            return Err(ServiceErr::InvalidInput(format!(
                "row {i}: has {} value(s), expected {width}",
                row.len()
            )));
        }

        for (j, value) in row.iter().enumerate() {
            let x = to_f64(value).ok_or_else(|| {
                ServiceErr::InvalidInput(format!("row {i}, column {j}: {}", not_a_number(value)))
            })?;
            flat.push(x);
        }
    }

    Array2::from_shape_vec((items.len(), width), flat)
        .map_err(|e| ServiceErr::InvalidInput(e.to_string()))
}

/// Reads a JSON number, or a string holding one. Non-finite values are rejected.
///
/// Booleans are not read as 0 or 1, `true` is an invalid value like any other non-number.
fn to_f64(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    x.is_finite().then_some(x)
}

fn not_a_number(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}' is not a finite number"),
        other => format!("expected a number, got {}", kind(other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
