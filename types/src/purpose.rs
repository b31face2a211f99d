//! Declared purpose of a visit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Why the visitor is on site. Only these four values are ever scored; any
/// other label is rejected when the intake form is filled in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitPurpose {
    #[default]
    Meeting,
    Interview,
    Delivery,
    Personal,
}

impl VisitPurpose {
    pub const ALL: [VisitPurpose; 4] = [
        VisitPurpose::Meeting,
        VisitPurpose::Interview,
        VisitPurpose::Delivery,
        VisitPurpose::Personal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Meeting => "Meeting",
            Self::Interview => "Interview",
            Self::Delivery => "Delivery",
            Self::Personal => "Personal",
        }
    }
}

impl fmt::Display for VisitPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VisitPurpose {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TypesError::UnknownPurpose(s.to_string()))
    }
}
