/// Shared data structures for datasets
///
/// These structs represent one row of a tutorial dataset table
/// and the class label it carries.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Class label of a sample
///
/// Tables written by different tools store the label as a boolean,
/// an integer (0/1) or free text, so all three are accepted as-is.
/// Whole-number floats (pandas writes `1.0` for integer columns with
/// gaps) are read as integers.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Label {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match LabelRepr::deserialize(deserializer)? {
            LabelRepr::Bool(value) => Ok(Label::Bool(value)),
            LabelRepr::Int(value) => Ok(Label::Int(value)),
            LabelRepr::Float(value)
                if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 =>
            {
                Ok(Label::Int(value as i64))
            }
            LabelRepr::Float(value) => Err(serde::de::Error::custom(format!(
                "invalid IsSuperman value: {}",
                value
            ))),
            LabelRepr::Text(value) => Ok(Label::Text(value)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Bool(value) => write!(f, "{}", value),
            Label::Int(value) => write!(f, "{}", value),
            Label::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Label::Bool(value)
    }
}

/// Represents a single image sample in a dataset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sample {
    /// Path to the image file
    #[serde(rename = "ImagePath")]
    pub image_path: PathBuf,
    /// Class indicator
    #[serde(rename = "IsSuperman")]
    pub label: Label,
    /// Model's predicted probability (None if the table has no predictions)
    #[serde(rename = "Probability", default)]
    pub probability: Option<f64>,
    /// Whether the model got this sample wrong (None if not scored)
    #[serde(
        rename = "IsMistake",
        default,
        deserialize_with = "deserialize_optional_flag"
    )]
    pub is_mistake: Option<bool>,
}

impl Sample {
    pub fn new(image_path: impl Into<PathBuf>, label: impl Into<Label>) -> Self {
        Self {
            image_path: image_path.into(),
            label: label.into(),
            probability: None,
            is_mistake: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn with_mistake(mut self, is_mistake: bool) -> Self {
        self.is_mistake = Some(is_mistake);
        self
    }

    pub fn path(&self) -> &Path {
        &self.image_path
    }

    /// Filename only (e.g., "superman_042.jpg")
    pub fn file_name(&self) -> String {
        self.image_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accepts true/false, True/False (pandas), 1/0 and empty cells
fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<FlagRepr>::deserialize(deserializer)?;
    let flag = match repr {
        None => None,
        Some(FlagRepr::Bool(value)) => Some(value),
        Some(FlagRepr::Int(value)) => Some(value != 0),
        Some(FlagRepr::Float(value)) if value.is_nan() => None,
        Some(FlagRepr::Float(value)) => Some(value != 0.0),
        Some(FlagRepr::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" | "nan" => None,
            "true" | "t" | "yes" | "1" => Some(true),
            "false" | "f" | "no" | "0" => Some(false),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "invalid IsMistake value: {}",
                    other
                )))
            }
        },
    };
    Ok(flag)
}
