use serde::{Deserialize, Serialize};

/// Self-reported profile attributes used by the profile-based analysis mode.
/// Supplied by the caller — profile storage lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub education_level: Option<String>,
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}
