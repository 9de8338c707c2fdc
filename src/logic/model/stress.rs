use serde::Serialize;

/// Crop stress classes, in the model's output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StressLevel {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Moderate Stress")]
    ModerateStress,
    #[serde(rename = "Severe Stress")]
    SevereStress,
}

impl StressLevel {
    pub const COUNT: usize = 3;

    pub const ALL: [StressLevel; Self::COUNT] = [
        StressLevel::Healthy,
        StressLevel::ModerateStress,
        StressLevel::SevereStress,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            StressLevel::Healthy => 0,
            StressLevel::ModerateStress => 1,
            StressLevel::SevereStress => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressLevel::Healthy => "Healthy",
            StressLevel::ModerateStress => "Moderate Stress",
            StressLevel::SevereStress => "Severe Stress",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for level in StressLevel::ALL {
            assert_eq!(StressLevel::from_index(level.index()), Some(level));
        }
        assert_eq!(StressLevel::from_index(3), None);
    }

    #[test]
    fn test_serialize_label() {
        let json = serde_json::to_string(&StressLevel::ModerateStress).unwrap();
        assert_eq!(json, "\"Moderate Stress\"");
    }
}
