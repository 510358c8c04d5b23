use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Shown in place of a reference image that fails to load.
pub const REFERENCE_PLACEHOLDER: &str = "/logo.svg";

/// Diagnostic target of a submission.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Disease,
    Pest,
}

impl Mode {
    /// Reference image attached to a successful prediction for this mode.
    pub fn reference_image(&self) -> &'static str {
        match self {
            Mode::Disease => "deadheart_01.jpg",
            Mode::Pest => "esb_01.jpg",
        }
    }

    pub fn reference_dir(&self) -> &'static str {
        match self {
            Mode::Disease => "deadheart",
            Mode::Pest => "esb",
        }
    }

    pub fn reference_image_path(&self, filename: &str) -> String {
        format!("/ref/{}/{}", self.reference_dir(), filename)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Disease => "Disease Detection",
            Mode::Pest => "Pest Detection",
        }
    }

    pub fn target_name(&self) -> &'static str {
        match self {
            Mode::Disease => "Dead Heart Disease",
            Mode::Pest => "Early Shoot Borer (ESB)",
        }
    }

    pub fn short_target(&self) -> &'static str {
        match self {
            Mode::Disease => "Dead Heart",
            Mode::Pest => "Early Shoot Borer",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Mode::Disease => "🦠 Disease",
            Mode::Pest => "🐛 Pest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_and_prints_lowercase() {
        assert_eq!(Mode::from_str("disease").unwrap(), Mode::Disease);
        assert_eq!(Mode::from_str("pest").unwrap(), Mode::Pest);
        assert!(Mode::from_str("weed").is_err());
        assert_eq!(Mode::Pest.to_string(), "pest");
        assert_eq!(serde_json::to_string(&Mode::Disease).unwrap(), "\"disease\"");
    }

    #[test]
    fn reference_lookup_is_fixed_per_mode() {
        assert_eq!(Mode::Disease.reference_image(), "deadheart_01.jpg");
        assert_eq!(Mode::Pest.reference_image(), "esb_01.jpg");
        assert_eq!(
            Mode::Pest.reference_image_path("esb_01.jpg"),
            "/ref/esb/esb_01.jpg"
        );
        assert_eq!(Mode::iter().count(), 2);
    }
}
