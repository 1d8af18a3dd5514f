use std::path::{Path, PathBuf};

use ethers::types::H256;
use hex_literal::hex;
use serde::{Deserialize, Serialize};

use crate::serde_utils;
use crate::types::{RevisionNumber, TokenAmount};

pub const STEP_VERIFIER_DIGEST: H256 = H256(hex!(
    "09bf185e9e478bac323981a844afe484dcd73823f6a34f5adb8cffe6c4436111"
));
pub const SKIP_VERIFIER_DIGEST: H256 = H256(hex!(
    "286fd609266936f71d552671b7553f1a0e59c7cf296112996bded1ca3bafa4a4"
));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub light_client: LightClientConfig,
    pub token: TokenConfig,
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightClientConfig {
    pub step_verifier_digest: H256,
    pub skip_verifier_digest: H256,
    pub revision_number: RevisionNumber,
    /// Client type the light client is registered under on the handler
    pub client_type: String,
    /// Source file of the proto marshaler library, relative to the contracts dir
    pub proto_marshaler_source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub initial_supply: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub port_id: String,
}

impl Default for LightClientConfig {
    fn default() -> Self {
        Self {
            step_verifier_digest: STEP_VERIFIER_DIGEST,
            skip_verifier_digest: SKIP_VERIFIER_DIGEST,
            revision_number: RevisionNumber(0),
            client_type: "tendermint-zk".to_string(),
            proto_marshaler_source: PathBuf::from(
                "contracts/TendermintZKLightClientProtoMarshaler.sol",
            ),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "simple".to_string(),
            symbol: "simple".to_string(),
            initial_supply: TokenAmount(1_000_000),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            port_id: "transfer".to_string(),
        }
    }
}

impl Config {
    pub async fn load(path: Option<&Path>) -> eyre::Result<Self> {
        match path {
            Some(path) => serde_utils::read_deserialize(path).await,
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() -> eyre::Result<()> {
        let config: Config = serde_yaml::from_str("{}")?;

        assert_eq!(config, Config::default());
        assert_eq!(
            config.light_client.step_verifier_digest,
            STEP_VERIFIER_DIGEST
        );
        assert_eq!(config.token.initial_supply, TokenAmount(1_000_000));
        assert_eq!(config.transfer.port_id, "transfer");

        Ok(())
    }

    #[test]
    fn partial_overrides_keep_other_defaults() -> eyre::Result<()> {
        let config: Config = serde_yaml::from_str(indoc! {r#"
            light_client:
              revision_number: 3
              skip_verifier_digest: "0x0000000000000000000000000000000000000000000000000000000000000001"
            token:
              symbol: SMPL
        "#})?;

        assert_eq!(config.light_client.revision_number, RevisionNumber(3));
        assert_eq!(
            config.light_client.skip_verifier_digest,
            H256::from_low_u64_be(1)
        );
        assert_eq!(
            config.light_client.step_verifier_digest,
            STEP_VERIFIER_DIGEST
        );
        assert_eq!(config.light_client.client_type, "tendermint-zk");
        assert_eq!(config.token.symbol, "SMPL");
        assert_eq!(config.token.name, "simple");

        Ok(())
    }

    #[tokio::test]
    async fn missing_path_uses_defaults() -> eyre::Result<()> {
        assert_eq!(Config::load(None).await?, Config::default());

        Ok(())
    }
}
