use serde::Serialize;

use super::SerializationError;

/// Serializes a value to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    Ok(serde_yaml::to_string(value)?)
}
