//! Input schema and Feature Record construction.
//!
//! A prediction request carries five numeric sensor readings. The two
//! categorical columns the model was trained with (`Type`, `Product ID`) are
//! never taken from the caller: every record is built with the server's
//! [`CategoricalDefaults`], and any caller-supplied values for those columns
//! are accepted and discarded.

use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const AIR_TEMPERATURE: &str = "Air temperature [K]";
pub const PROCESS_TEMPERATURE: &str = "Process temperature [K]";
pub const ROTATIONAL_SPEED: &str = "Rotational speed [rpm]";
pub const TORQUE: &str = "Torque [Nm]";
pub const TOOL_WEAR: &str = "Tool wear [min]";
pub const EQUIPMENT_TYPE: &str = "Type";
pub const PRODUCT_ID: &str = "Product ID";

/// The five caller-supplied numeric columns, in record order.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    AIR_TEMPERATURE,
    PROCESS_TEMPERATURE,
    ROTATIONAL_SPEED,
    TORQUE,
    TOOL_WEAR,
];

/// The two categorical columns, in record order.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [EQUIPMENT_TYPE, PRODUCT_ID];

/// Every column of a Feature Record, in the order the artifacts expect.
pub const FEATURE_COLUMNS: [&str; 7] = [
    AIR_TEMPERATURE,
    PROCESS_TEMPERATURE,
    ROTATIONAL_SPEED,
    TORQUE,
    TOOL_WEAR,
    EQUIPMENT_TYPE,
    PRODUCT_ID,
];

/// Request keys that are tolerated but never used.
///
/// The form posts hidden `type` / `product_id` inputs, and older clients send
/// the record column names directly.
pub const IGNORED_FIELDS: &[&str] = &[EQUIPMENT_TYPE, PRODUCT_ID, "type", "product_id"];

/// Equipment type written into every record unless configured otherwise.
pub const DEFAULT_EQUIPMENT_TYPE: &str = "L";

/// Product identifier written into every record unless configured otherwise.
pub const DEFAULT_PRODUCT_ID: &str = "M14860";

// ---------------------------------------------------------------------------
// Categorical defaults
// ---------------------------------------------------------------------------

/// Fixed categorical values injected into every Feature Record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalDefaults {
    pub equipment_type: String,
    pub product_id: String,
}

impl Default for CategoricalDefaults {
    fn default() -> Self {
        Self {
            equipment_type: DEFAULT_EQUIPMENT_TYPE.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor readings (request schema)
// ---------------------------------------------------------------------------

/// The five numeric readings a caller submits for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
}

impl SensorReadings {
    /// Parse a raw JSON request body.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::Validation(format!("Invalid JSON body: {e}")))?;
        Self::from_json(&value)
    }

    /// Validate and coerce a JSON object into readings.
    ///
    /// Each numeric field may be a JSON number or a string holding a number.
    /// Missing fields, unknown keys, and values that are not finite numbers
    /// are rejected with a message naming the offending field.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let object = value.as_object().ok_or_else(|| {
            CoreError::Validation(format!(
                "Request body must be a JSON object, got {}",
                json_type_name(value)
            ))
        })?;

        reject_unknown_fields(object)?;

        Ok(Self {
            air_temperature: numeric_field(object, AIR_TEMPERATURE)?,
            process_temperature: numeric_field(object, PROCESS_TEMPERATURE)?,
            rotational_speed: numeric_field(object, ROTATIONAL_SPEED)?,
            torque: numeric_field(object, TORQUE)?,
            tool_wear: numeric_field(object, TOOL_WEAR)?,
        })
    }
}

fn reject_unknown_fields(object: &Map<String, Value>) -> Result<(), CoreError> {
    let mut unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|k| !NUMERIC_COLUMNS.contains(k) && !IGNORED_FIELDS.contains(k))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort_unstable();
    Err(CoreError::Validation(format!(
        "Unknown field(s): {}. Expected: {}",
        unknown.join(", "),
        NUMERIC_COLUMNS.join(", ")
    )))
}

fn numeric_field(object: &Map<String, Value>, name: &str) -> Result<f64, CoreError> {
    let value = object
        .get(name)
        .ok_or_else(|| CoreError::Validation(format!("Missing required field '{name}'")))?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        CoreError::Validation(format!(
            "Field '{name}' must be a number, got {}: {value}",
            json_type_name(value)
        ))
    })?;

    if !number.is_finite() {
        return Err(CoreError::Validation(format!(
            "Field '{name}' must be a finite number, got {number}"
        )));
    }
    Ok(number)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Feature Record
// ---------------------------------------------------------------------------

/// A single cell of a Feature Record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

/// One row of model input: the caller's readings plus the fixed categoricals.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub readings: SensorReadings,
    pub equipment_type: String,
    pub product_id: String,
}

impl FeatureRecord {
    pub fn new(readings: SensorReadings, defaults: &CategoricalDefaults) -> Self {
        Self {
            readings,
            equipment_type: defaults.equipment_type.clone(),
            product_id: defaults.product_id.clone(),
        }
    }

    /// Look up a cell by column name.
    pub fn value(&self, column: &str) -> Option<ColumnValue<'_>> {
        let r = &self.readings;
        let value = match column {
            AIR_TEMPERATURE => ColumnValue::Numeric(r.air_temperature),
            PROCESS_TEMPERATURE => ColumnValue::Numeric(r.process_temperature),
            ROTATIONAL_SPEED => ColumnValue::Numeric(r.rotational_speed),
            TORQUE => ColumnValue::Numeric(r.torque),
            TOOL_WEAR => ColumnValue::Numeric(r.tool_wear),
            EQUIPMENT_TYPE => ColumnValue::Categorical(&self.equipment_type),
            PRODUCT_ID => ColumnValue::Categorical(&self.product_id),
            _ => return None,
        };
        Some(value)
    }

    /// The five numeric cells in record order.
    pub fn numeric_values(&self) -> [f64; 5] {
        let r = &self.readings;
        [
            r.air_temperature,
            r.process_temperature,
            r.rotational_speed,
            r.torque,
            r.tool_wear,
        ]
    }
}
