//! Scanner flavors and contract families.

use serde::{Deserialize, Serialize};

/// Which half of the platform a scanner indexes.
///
/// Each flavor runs as its own process with its own checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Logistics,
    Token,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logistics => "logistics",
            Self::Token => "token",
        }
    }

    /// The family the genesis (root) contract must carry.
    pub fn root_family(&self) -> ContractFamily {
        match self {
            Self::Logistics => ContractFamily::Service,
            Self::Token => ContractFamily::Token,
        }
    }

    /// Returns `true` if transactions against `family` belong to this flavor.
    pub fn accepts(&self, family: ContractFamily) -> bool {
        match self {
            Self::Logistics => matches!(
                family,
                ContractFamily::Service | ContractFamily::Company | ContractFamily::Order
            ),
            Self::Token => family == ContractFamily::Token,
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "logistics" => Ok(Self::Logistics),
            "token" => Ok(Self::Token),
            other => Err(format!("unknown flavor '{other}'")),
        }
    }
}

/// The family tag a recognized contract reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractFamily {
    Service,
    Company,
    Order,
    Token,
}

impl ContractFamily {
    /// Map the on-chain tag string. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "service" => Some(Self::Service),
            "company" => Some(Self::Company),
            "order" => Some(Self::Order),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Company => "company",
            Self::Order => "order",
            Self::Token => "token",
        }
    }
}

impl std::fmt::Display for ContractFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
