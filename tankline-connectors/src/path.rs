//! Signal K path rules
//!
//! Signal K paths are dot-separated keys such as `tanks.fuel.currentLevel`
//! or `sensorDevice.tank-sensor.uptime`. Each segment is non-empty and uses
//! ASCII letters, digits, `_` or `-`.

use thiserror::Error;

/// Why a path was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },

    #[error("invalid character {character:?} in segment {segment:?}")]
    InvalidCharacter { segment: String, character: char },
}

/// Check that `path` is a well-formed Signal K path
pub fn validate_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    for (position, segment) in path.split('.').enumerate() {
        if segment.is_empty() {
            return Err(PathError::EmptySegment { position });
        }

        if let Some(character) = segment.chars().find(|c| !is_segment_char(*c)) {
            return Err(PathError::InvalidCharacter {
                segment: segment.to_string(),
                character,
            });
        }
    }

    Ok(())
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Configuration path for a transform feeding `signalk_path`
///
/// `("tanks.fuel.currentLevel", "linear")` gives
/// `/tanks_fuel_currentLevel/linear`.
pub fn config_path(signalk_path: &str, leaf: &str) -> String {
    format!("/{}/{}", signalk_path.replace('.', "_"), leaf)
}
