use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The six RIASEC (Holland Code) categories. Variant order is the canonical
/// R-I-A-S-E-C order, which `BTreeMap` keys preserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiasecCategory {
    Realistic,
    Investigative,
    Artistic,
    Social,
    Enterprising,
    Conventional,
}

impl RiasecCategory {
    pub const ALL: [RiasecCategory; 6] = [
        RiasecCategory::Realistic,
        RiasecCategory::Investigative,
        RiasecCategory::Artistic,
        RiasecCategory::Social,
        RiasecCategory::Enterprising,
        RiasecCategory::Conventional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiasecCategory::Realistic => "realistic",
            RiasecCategory::Investigative => "investigative",
            RiasecCategory::Artistic => "artistic",
            RiasecCategory::Social => "social",
            RiasecCategory::Enterprising => "enterprising",
            RiasecCategory::Conventional => "conventional",
        }
    }

    pub fn parse(s: &str) -> Option<RiasecCategory> {
        RiasecCategory::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Per-category sums of Likert answers. Categories the user never answered
/// are absent, not zero.
pub type RiasecScores = BTreeMap<RiasecCategory, u32>;

/// Raw quiz answers keyed `"category-questionIndex"`, values 1–5.
/// This map is the idempotency/cache key for a submission.
pub type ResponseMap = BTreeMap<String, u8>;
