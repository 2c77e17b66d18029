//! Intensity measure components

use serde::{Deserialize, Serialize};

/// Horizontal/vertical component a ground-motion model is defined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntensityMeasureComponent {
    GeometricMean,
    AverageHorizontal,
    GreaterOfTwoHorizontal,
    RotD50,
    RotD100,
    Horizontal,
    Vertical,
}

impl IntensityMeasureComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeometricMean => "Average Horizontal (GMRotI50)",
            Self::AverageHorizontal => "Average horizontal",
            Self::GreaterOfTwoHorizontal => "Greater of two horizontal",
            Self::RotD50 => "Average Horizontal (RotD50)",
            Self::RotD100 => "Horizontal Maximum Direction (RotD100)",
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
        }
    }
}

impl std::fmt::Display for IntensityMeasureComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
