use std::collections::HashMap;

use async_trait::async_trait;
use ethers::types::Address;
use ethers::utils::get_contract_address;
use eyre::ContextCompat;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{CallRequest, CreateRequest, ExecutionEnvironment};
use crate::report::contract_deployment::ContractDeployment;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Create(CreateRequest),
    Call(CallRequest),
}

/// In-memory stand-in for a chain.
///
/// Addresses follow the CREATE scheme of the configured deployer, so a fresh
/// environment always hands out the same sequence.
#[derive(Debug)]
pub struct DryRunEnvironment {
    deployer: Address,
    fail_at: Option<usize>,
    state: Mutex<DryRunState>,
}

#[derive(Debug, Default)]
struct DryRunState {
    nonce: u64,
    requests: Vec<RecordedRequest>,
    deployed: HashMap<Address, String>,
}

impl DryRunEnvironment {
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            fail_at: None,
            state: Mutex::new(DryRunState::default()),
        }
    }

    /// Rejects the request with the given zero based index
    #[cfg(test)]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    fn check_injected_failure(&self, index: usize) -> eyre::Result<()> {
        if self.fail_at == Some(index) {
            eyre::bail!("Request #{index} rejected by the dry run environment");
        }

        Ok(())
    }
}

#[async_trait]
impl ExecutionEnvironment for DryRunEnvironment {
    #[instrument(skip_all, fields(contract = %request.contract))]
    async fn create(
        &self,
        request: &CreateRequest,
    ) -> eyre::Result<ContractDeployment> {
        let mut state = self.state.lock().await;

        let index = state.requests.len();
        state.requests.push(RecordedRequest::Create(request.clone()));
        self.check_injected_failure(index)?;

        for library in &request.libraries {
            state.deployed.get(&library.address).with_context(|| {
                format!(
                    "Library {} is not deployed at {:?}",
                    library.name, library.address
                )
            })?;
        }

        let address = get_contract_address(self.deployer, state.nonce);
        state.nonce += 1;
        state.deployed.insert(address, request.contract.clone());

        debug!(?address, "Simulated deployment");

        Ok(ContractDeployment {
            contract: request.contract.clone(),
            address,
            transaction_hash: None,
        })
    }

    #[instrument(skip_all, fields(method = %request.method))]
    async fn call(&self, request: &CallRequest) -> eyre::Result<()> {
        let mut state = self.state.lock().await;

        let index = state.requests.len();
        state.requests.push(RecordedRequest::Call(request.clone()));
        self.check_injected_failure(index)?;

        let deployed = state
            .deployed
            .get(&request.to)
            .with_context(|| format!("No contract at {:?}", request.to))?;

        if *deployed != request.contract {
            eyre::bail!(
                "{:?} holds {deployed}, not {}",
                request.to,
                request.contract
            );
        }

        state.nonce += 1;

        Ok(())
    }

    fn is_ephemeral(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(contract: &str) -> CreateRequest {
        CreateRequest {
            contract: contract.to_string(),
            constructor_args: vec![],
            libraries: vec![],
        }
    }

    #[tokio::test]
    async fn addresses_follow_the_deployer_nonce() -> eyre::Result<()> {
        let deployer = Address::from_low_u64_be(0xdead);
        let env = DryRunEnvironment::new(deployer);

        let first = env.create(&create("A")).await?;
        let second = env.create(&create("B")).await?;

        assert_eq!(first.address, get_contract_address(deployer, 0u64));
        assert_eq!(second.address, get_contract_address(deployer, 1u64));
        assert_eq!(env.requests().await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn injected_failure_is_still_recorded() -> eyre::Result<()> {
        let env = DryRunEnvironment::new(Address::zero()).failing_at(1);

        env.create(&create("A")).await?;
        assert!(env.create(&create("B")).await.is_err());

        assert_eq!(
            env.requests().await,
            vec![
                RecordedRequest::Create(create("A")),
                RecordedRequest::Create(create("B")),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn calls_need_a_matching_contract() -> eyre::Result<()> {
        let env = DryRunEnvironment::new(Address::zero());
        let bank = env.create(&create("ICS20Bank")).await?;

        let call = |contract: &str, to: Address| CallRequest {
            contract: contract.to_string(),
            to,
            method: "setOperator".to_string(),
            args: vec![],
        };

        env.call(&call("ICS20Bank", bank.address)).await?;
        assert!(env.call(&call("ERC20Token", bank.address)).await.is_err());
        assert!(env
            .call(&call("ICS20Bank", Address::from_low_u64_be(1)))
            .await
            .is_err());

        Ok(())
    }
}
