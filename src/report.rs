use std::collections::BTreeMap;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use self::contract_deployment::ContractDeployment;
use crate::config::Config;
use crate::deployment::artifact::ArtifactKey;
use crate::deployment::orchestrator::PlanOutcome;
use crate::deployment::variant::LightClientVariant;

pub mod contract_deployment;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringRecord {
    pub target: ArtifactKey,
    pub address: Address,
    pub method: String,
}

/// Written once the whole plan went through, never read back by the deployer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub light_client_variant: LightClientVariant,
    pub config: Config,
    pub artifacts: BTreeMap<ArtifactKey, ContractDeployment>,
    #[serde(default)]
    pub wiring: Vec<WiringRecord>,
}

impl Report {
    pub fn new(config: &Config, outcome: PlanOutcome) -> Self {
        Self {
            light_client_variant: outcome.variant,
            config: config.clone(),
            artifacts: outcome.registry.into_inner(),
            wiring: outcome.wiring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::orchestrator::Orchestrator;
    use crate::deployment::plan::DeploymentPlan;
    use crate::environment::DryRunEnvironment;
    use crate::serde_utils;

    #[tokio::test]
    async fn report_survives_the_disk() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("report.yml");

        let config = Config::default();
        let env = DryRunEnvironment::new(Address::from_low_u64_be(3));
        let outcome = Orchestrator::new(&env)
            .run_plan(&DeploymentPlan::new(LightClientVariant::Mock, &config))
            .await?;
        let transfer_bank =
            outcome.registry.address(ArtifactKey::Ics20TransferBank)?;

        serde_utils::write_serialize(&path, Report::new(&config, outcome))
            .await?;
        let report: Report = serde_utils::read_deserialize(&path).await?;

        assert_eq!(report.light_client_variant, LightClientVariant::Mock);
        assert_eq!(report.config, config);
        assert_eq!(report.artifacts.len(), 11);
        assert_eq!(
            report.artifacts[&ArtifactKey::Ics20TransferBank].address,
            transfer_bank
        );
        assert_eq!(
            report.artifacts[&ArtifactKey::LightClient].contract,
            "TendermintZKLightClientMock"
        );
        assert_eq!(
            report
                .wiring
                .iter()
                .map(|record| record.method.as_str())
                .collect::<Vec<_>>(),
            vec!["bindPort", "registerClient", "setOperator"]
        );

        let raw = tokio::fs::read_to_string(&path).await?;
        assert!(raw.contains("light_client_variant: mock"));
        assert!(raw.contains("ics20_transfer_bank:"));

        Ok(())
    }
}
