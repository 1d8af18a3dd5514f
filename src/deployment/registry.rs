use std::collections::BTreeMap;

use ethers::types::Address;

use super::artifact::ArtifactKey;
use crate::error::DeployError;
use crate::report::contract_deployment::ContractDeployment;

/// Append-only table of the deployments produced during one run
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    deployments: BTreeMap<ArtifactKey, ContractDeployment>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        key: ArtifactKey,
        deployment: ContractDeployment,
    ) -> Result<(), DeployError> {
        if self.deployments.contains_key(&key) {
            return Err(DeployError::DuplicateArtifact(key));
        }

        self.deployments.insert(key, deployment);

        Ok(())
    }

    pub fn get(
        &self,
        key: ArtifactKey,
    ) -> Result<&ContractDeployment, DeployError> {
        self.deployments
            .get(&key)
            .ok_or(DeployError::UnresolvedReference(key))
    }

    pub fn address(&self, key: ArtifactKey) -> Result<Address, DeployError> {
        Ok(self.get(key)?.address)
    }

    pub fn into_inner(self) -> BTreeMap<ArtifactKey, ContractDeployment> {
        self.deployments
    }
}
