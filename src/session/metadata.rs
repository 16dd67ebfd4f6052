use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Terrain taxonomy recorded verbatim in every metadata file. Class 2 is
/// reserved and intentionally absent.
pub const LABEL_TAXONOMY: &str = "0:grass, 1:sand, 3:concrete, 4:soil";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LabelComment {
    pub label: String,
}

/// One session's operator-entered measurements plus the fixed taxonomy
/// annotation, serialized as the session's YAML record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub force_z: f64,
    pub label: i64,
    #[serde(rename = "_comment")]
    pub comment: LabelComment,
}

impl MetadataRecord {
    pub fn new(force_z: f64, label: i64) -> Self {
        Self {
            force_z,
            label,
            comment: LabelComment {
                label: LABEL_TAXONOMY.to_string(),
            },
        }
    }
}

/// Why a confirmed entry pair could not become a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryParseError {
    InvalidForce(String),
    InvalidLabel(String),
}

impl fmt::Display for EntryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryParseError::InvalidForce(text) => {
                write!(f, "'{}' is not a valid force_z reading", text)
            }
            EntryParseError::InvalidLabel(text) => {
                write!(f, "'{}' is not a valid terrain label", text)
            }
        }
    }
}

impl Error for EntryParseError {}

/// Parses the two confirmed entry buffers into a record. Failures are
/// ordinary values for the caller to match on, not aborts.
pub fn parse_entries(
    force_z: &str,
    label: &str,
) -> Result<MetadataRecord, EntryParseError> {
    let force = force_z
        .parse::<f64>()
        .map_err(|_| EntryParseError::InvalidForce(force_z.to_string()))?;

    let class = label
        .parse::<i64>()
        .map_err(|_| EntryParseError::InvalidLabel(label.to_string()))?;

    Ok(MetadataRecord::new(force, class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_entries_become_a_record() {
        let record = parse_entries("0.42", "3").unwrap();

        assert_eq!(record.force_z, 0.42);
        assert_eq!(record.label, 3);
        assert_eq!(record.comment.label, LABEL_TAXONOMY);
    }

    #[test]
    fn bare_point_is_not_a_force_reading() {
        assert_eq!(
            parse_entries(".", "1"),
            Err(EntryParseError::InvalidForce(".".to_string()))
        );
    }

    #[test]
    fn empty_buffers_fail_in_field_order() {
        assert_eq!(
            parse_entries("", ""),
            Err(EntryParseError::InvalidForce(String::new()))
        );
        assert_eq!(
            parse_entries("1.5", ""),
            Err(EntryParseError::InvalidLabel(String::new()))
        );
    }

    #[test]
    fn fractional_labels_are_rejected() {
        assert_eq!(
            parse_entries("1.5", "2.0"),
            Err(EntryParseError::InvalidLabel("2.0".to_string()))
        );
    }

    #[test]
    fn records_round_trip_through_yaml() {
        let record = MetadataRecord::new(12.5, 4);

        let yaml = serde_yml::to_string(&record).unwrap();
        assert!(yaml.contains("force_z"));
        assert!(yaml.contains("_comment"));
        assert!(yaml.contains(LABEL_TAXONOMY));

        let parsed: MetadataRecord = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, record);
    }
}
