//! Compression level choice for the compress flow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Less,
    #[default]
    Recommended,
    Extreme,
}

/// The backend's rendering profile for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressionSettings {
    pub deflate_level: u8,
    pub image_quality: u8,
    pub image_resolution: u16,
}

impl CompressionLevel {
    pub const ALL: [CompressionLevel; 3] = [
        CompressionLevel::Less,
        CompressionLevel::Recommended,
        CompressionLevel::Extreme,
    ];

    /// Value of the `level` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionLevel::Less => "less",
            CompressionLevel::Recommended => "recommended",
            CompressionLevel::Extreme => "extreme",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompressionLevel::Less => {
                "High quality, less compression - Preserves maximum image quality"
            }
            CompressionLevel::Recommended => {
                "Good quality, good compression - Best balance of size and quality"
            }
            CompressionLevel::Extreme => {
                "Less quality, high compression - Maximum file size reduction"
            }
        }
    }

    pub fn settings(&self) -> CompressionSettings {
        match self {
            CompressionLevel::Less => CompressionSettings {
                deflate_level: 1,
                image_quality: 95,
                image_resolution: 300,
            },
            CompressionLevel::Recommended => CompressionSettings {
                deflate_level: 6,
                image_quality: 75,
                image_resolution: 150,
            },
            CompressionLevel::Extreme => CompressionSettings {
                deflate_level: 9,
                image_quality: 50,
                image_resolution: 72,
            },
        }
    }

    /// Lenient parse: anything unknown is treated as Recommended, as the
    /// backend does
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "less" => Ok(CompressionLevel::Less),
            "recommended" => Ok(CompressionLevel::Recommended),
            "extreme" => Ok(CompressionLevel::Extreme),
            other => Err(format!(
                "Invalid compression level '{}'. Must be 'less', 'recommended', or 'extreme'",
                other
            )),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_recommended() {
        assert_eq!(CompressionLevel::default(), CompressionLevel::Recommended);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "Extreme".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Extreme
        );
        assert!("maximum".parse::<CompressionLevel>().is_err());
        assert_eq!(
            CompressionLevel::parse_or_default("maximum"),
            CompressionLevel::Recommended
        );
    }

    #[test]
    fn test_settings_get_stronger() {
        let less = CompressionLevel::Less.settings();
        let extreme = CompressionLevel::Extreme.settings();
        assert!(less.deflate_level < extreme.deflate_level);
        assert!(less.image_resolution > extreme.image_resolution);
        assert_eq!(CompressionLevel::Recommended.settings().image_resolution, 150);
    }

    #[test]
    fn test_form_value_round_trips_through_display() {
        for level in CompressionLevel::ALL {
            assert_eq!(level.to_string().parse::<CompressionLevel>().unwrap(), level);
        }
    }
}
