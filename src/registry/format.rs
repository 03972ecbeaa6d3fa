//! Artifact file formats

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// On-disk encoding of a model artifact, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Json,
    Yaml,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            Self::Json => serde_json::to_vec(value)
                .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}"))),
            Self::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}"))),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T> {
        match self {
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| Error::Serialization(format!("JSON parsing failed: {e}"))),
            Self::Yaml => serde_yaml::from_slice(bytes)
                .map_err(|e| Error::Serialization(format!("YAML parsing failed: {e}"))),
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(Error::Config(format!(
                "unsupported artifact extension '{other}'. Use: json, yaml"
            ))),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!("json".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Json);
        assert_eq!(".YML".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Yaml);
        assert!("h5".parse::<ArtifactFormat>().is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let value = vec![1.5_f32, -2.0];
        let bytes = ArtifactFormat::Yaml.encode(&value).unwrap();
        let back: Vec<f32> = ArtifactFormat::Yaml.decode(&bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let err = ArtifactFormat::Json.decode::<Vec<f32>>(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
