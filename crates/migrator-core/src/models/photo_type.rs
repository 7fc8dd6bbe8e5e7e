use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Kind of photo a migration record describes. Selects the derivative recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoType {
    ProfileDistributor,
    ProfileRepresentative,
    Product,
    Representative,
}

impl PhotoType {
    pub const ALL: [PhotoType; 4] = [
        PhotoType::ProfileDistributor,
        PhotoType::ProfileRepresentative,
        PhotoType::Product,
        PhotoType::Representative,
    ];

    /// Wire tag used in object metadata and record documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::ProfileDistributor => "PROFILE_DISTRIBUTOR",
            PhotoType::ProfileRepresentative => "PROFILE_REPRESENTATIVE",
            PhotoType::Product => "PRODUCT",
            PhotoType::Representative => "REPRESENTATIVE",
        }
    }
}

impl Display for PhotoType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PhotoType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PROFILE_DISTRIBUTOR" => Ok(PhotoType::ProfileDistributor),
            "PROFILE_REPRESENTATIVE" => Ok(PhotoType::ProfileRepresentative),
            "PRODUCT" => Ok(PhotoType::Product),
            "REPRESENTATIVE" => Ok(PhotoType::Representative),
            _ => Err(anyhow::anyhow!("Invalid photo type: {}", s)),
        }
    }
}
