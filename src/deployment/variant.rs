use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::DeployError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LightClientVariant {
    Mock,
    Groth16,
    Groth16Commitment,
}

impl LightClientVariant {
    pub fn contract_name(&self) -> &'static str {
        match self {
            Self::Mock => "TendermintZKLightClientMock",
            Self::Groth16 => "TendermintZKLightClientGroth16",
            Self::Groth16Commitment => {
                "TendermintZKLightClientGroth16Commitment"
            }
        }
    }
}

/// Maps the raw selector onto a variant by exact match.
///
/// An unset value is as fatal as an unknown one.
pub fn select_variant(
    selector: Option<&str>,
) -> Result<LightClientVariant, DeployError> {
    selector
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| DeployError::Configuration {
            value: selector.map(ToOwned::to_owned),
            expected: LightClientVariant::iter()
                .map(|variant| variant.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
