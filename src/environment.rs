use std::path::PathBuf;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;

use crate::report::contract_deployment::ContractDeployment;

pub mod dry_run;
pub mod forge;

pub use self::dry_run::DryRunEnvironment;
pub use self::forge::ForgeEnvironment;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedLibrary {
    pub name: String,
    pub source: PathBuf,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub contract: String,
    pub constructor_args: Vec<Token>,
    pub libraries: Vec<LinkedLibrary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    /// Contract whose ABI describes `method`
    pub contract: String,
    pub to: Address,
    pub method: String,
    pub args: Vec<Token>,
}

/// Where contracts get created and called.
///
/// Both operations return only once the effect is confirmed.
#[async_trait]
pub trait ExecutionEnvironment: Send + Sync {
    async fn create(
        &self,
        request: &CreateRequest,
    ) -> eyre::Result<ContractDeployment>;

    async fn call(&self, request: &CallRequest) -> eyre::Result<()>;

    /// Whether whatever gets deployed here vanishes with the process
    fn is_ephemeral(&self) -> bool;
}
