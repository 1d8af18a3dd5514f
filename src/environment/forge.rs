use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::{Abi, ParamType, Token};
use ethers::prelude::SignerMiddleware;
use ethers::providers::{Middleware, Provider};
use ethers::signers::{Signer, Wallet};
use reqwest::Url;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::{CallRequest, CreateRequest, ExecutionEnvironment};
use crate::cli::PrivateKey;
use crate::ethers_utils::{RpcSigner, TransactionBuilder};
use crate::forge_utils::{
    ContractSpec, ExternalDep, ForgeCreate, ForgeInspectAbi,
};
use crate::report::contract_deployment::ContractDeployment;

/// Chain id hardhat and anvil use for their throwaway in-process chains
pub const EPHEMERAL_CHAIN_ID: u64 = 31337;

/// Deploys through `forge create` and wires through an ethers signer,
/// both sharing one locally tracked nonce.
#[derive(Debug)]
pub struct ForgeEnvironment {
    contracts_dir: PathBuf,
    private_key: PrivateKey,
    rpc_url: Url,
    rpc_signer: Arc<RpcSigner>,
    chain_id: u64,
    nonce: AtomicU64,
    etherscan_api_key: Option<String>,
    abis: Mutex<HashMap<String, Abi>>,
}

impl ForgeEnvironment {
    #[instrument(name = "connect", skip_all, fields(rpc_url = %rpc_url))]
    pub async fn connect(
        contracts_dir: PathBuf,
        private_key: PrivateKey,
        rpc_url: Url,
        etherscan_api_key: Option<String>,
    ) -> eyre::Result<Self> {
        let provider = Provider::try_from(rpc_url.as_str())?;
        let chain_id = provider.get_chainid().await?.as_u64();
        let wallet =
            Wallet::from(private_key.key.clone()).with_chain_id(chain_id);

        let wallet_address = wallet.address();

        let signer = SignerMiddleware::new(provider, wallet);

        let nonce = signer.get_transaction_count(wallet_address, None).await?;
        let balance = signer.get_balance(wallet_address, None).await?;

        println!(
            "Deploying the contracts with the account: {wallet_address:?}"
        );
        println!("Account balance: {balance}");
        info!(chain_id, %nonce, "Connected");

        let rpc_signer = Arc::new(RpcSigner(Arc::new(signer)));

        Ok(Self {
            contracts_dir,
            private_key,
            rpc_url,
            rpc_signer,
            chain_id,
            nonce: AtomicU64::new(nonce.as_u64()),
            etherscan_api_key,
            abis: Mutex::new(HashMap::new()),
        })
    }

    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    fn forge_create(&self, contract_spec: ContractSpec) -> ForgeCreate {
        let mut forge_create = ForgeCreate::new(contract_spec)
            .with_cwd(&self.contracts_dir)
            .with_private_key(self.private_key.clone())
            .with_rpc_url(self.rpc_url.to_string())
            .with_override_nonce(self.next_nonce());

        if let Some(etherscan_api_key) = self.etherscan_api_key.as_ref() {
            forge_create = forge_create
                .with_verification_api_key(etherscan_api_key.clone());
        }

        forge_create
    }

    async fn abi(&self, contract: &str) -> eyre::Result<Abi> {
        let mut abis = self.abis.lock().await;

        if let Some(abi) = abis.get(contract) {
            return Ok(abi.clone());
        }

        let abi = ForgeInspectAbi::new(ContractSpec::name(contract))
            .with_cwd(&self.contracts_dir)
            .run()
            .await?;

        abis.insert(contract.to_string(), abi.clone());

        Ok(abi)
    }
}

#[async_trait]
impl ExecutionEnvironment for ForgeEnvironment {
    #[instrument(skip_all, fields(contract = %request.contract))]
    async fn create(
        &self,
        request: &CreateRequest,
    ) -> eyre::Result<ContractDeployment> {
        let abi = self.abi(&request.contract).await?;
        check_constructor(&abi, request)?;

        let mut forge_create =
            self.forge_create(ContractSpec::name(&request.contract));

        for library in &request.libraries {
            forge_create =
                forge_create.with_external_dep(ExternalDep::path_name_address(
                    &library.source,
                    &library.name,
                    library.address,
                ));
        }

        for arg in &request.constructor_args {
            forge_create =
                forge_create.with_constructor_arg(constructor_arg(arg)?);
        }

        let output = forge_create.run().await?;

        info!(deployer = ?output.deployer, "Confirmed");

        Ok(ContractDeployment::from_forge_output(&request.contract, output))
    }

    #[instrument(skip_all, fields(method = %request.method, to = ?request.to))]
    async fn call(&self, request: &CallRequest) -> eyre::Result<()> {
        let abi = self.abi(&request.contract).await?;

        TransactionBuilder::default()
            .signer(self.rpc_signer.clone())
            .abi(abi)
            .function_name(&request.method)
            .args(Token::Tuple(request.args.clone()))
            .to(request.to)
            .nonce(self.next_nonce())
            .build()?
            .send()
            .await?;

        Ok(())
    }

    fn is_ephemeral(&self) -> bool {
        self.chain_id == EPHEMERAL_CHAIN_ID
    }
}

/// Rejects a creation whose arguments don't fit the compiled constructor
/// before anything is broadcast.
fn check_constructor(abi: &Abi, request: &CreateRequest) -> eyre::Result<()> {
    let expected: Vec<ParamType> = abi
        .constructor()
        .map(|constructor| {
            constructor
                .inputs
                .iter()
                .map(|input| input.kind.clone())
                .collect()
        })
        .unwrap_or_default();

    if !Token::types_check(&request.constructor_args, &expected) {
        eyre::bail!(
            "Constructor of {} expects {:?}, got {:?}",
            request.contract,
            expected,
            request.constructor_args
        );
    }

    Ok(())
}

/// Renders a value the way `forge create --constructor-args` parses it
fn constructor_arg(token: &Token) -> eyre::Result<String> {
    let arg = match token {
        Token::Address(address) => format!("{address:?}"),
        Token::FixedBytes(bytes) | Token::Bytes(bytes) => {
            format!("0x{}", hex::encode(bytes))
        }
        Token::Uint(value) | Token::Int(value) => value.to_string(),
        Token::Bool(value) => value.to_string(),
        Token::String(value) => value.clone(),
        other => eyre::bail!("Unsupported constructor argument {other:?}"),
    };

    Ok(arg)
}

#[cfg(test)]
mod tests {
    use ethers::types::{Address, H256, U256};
    use serde_json::json;

    use super::*;

    fn abi_with_constructor(inputs: &[&str]) -> eyre::Result<Abi> {
        let inputs: Vec<_> = inputs
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                json!({ "name": format!("arg{i}"), "type": kind, "internalType": kind })
            })
            .collect();

        Ok(serde_json::from_value(json!([{
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": inputs,
        }]))?)
    }

    fn request(args: Vec<Token>) -> CreateRequest {
        CreateRequest {
            contract: "TendermintZKLightClientMock".to_string(),
            constructor_args: args,
            libraries: vec![],
        }
    }

    #[test]
    fn renders_constructor_args() -> eyre::Result<()> {
        assert_eq!(
            constructor_arg(&Token::Address(Address::from_low_u64_be(16)))?,
            "0x0000000000000000000000000000000000000010"
        );
        assert_eq!(
            constructor_arg(&Token::FixedBytes(
                H256::from_low_u64_be(1).as_bytes().to_vec()
            ))?,
            format!("0x{}01", "0".repeat(62))
        );
        assert_eq!(
            constructor_arg(&Token::Uint(U256::from(1_000_000)))?,
            "1000000"
        );
        assert_eq!(constructor_arg(&Token::String("simple".into()))?, "simple");
        assert!(constructor_arg(&Token::Array(vec![])).is_err());

        Ok(())
    }

    #[test]
    fn constructor_signature_must_match() -> eyre::Result<()> {
        let abi = abi_with_constructor(&[
            "address", "bytes32", "bytes32", "uint64",
        ])?;

        let matching = request(vec![
            Token::Address(Address::zero()),
            Token::FixedBytes(vec![0; 32]),
            Token::FixedBytes(vec![1; 32]),
            Token::Uint(U256::zero()),
        ]);
        check_constructor(&abi, &matching)?;

        let missing_revision = request(matching.constructor_args[..3].to_vec());
        assert!(check_constructor(&abi, &missing_revision).is_err());

        let swapped = request(vec![
            Token::FixedBytes(vec![0; 32]),
            Token::Address(Address::zero()),
            Token::FixedBytes(vec![1; 32]),
            Token::Uint(U256::zero()),
        ]);
        assert!(check_constructor(&abi, &swapped).is_err());

        Ok(())
    }

    #[test]
    fn no_constructor_means_no_args() -> eyre::Result<()> {
        let abi: Abi = serde_json::from_str("[]")?;

        check_constructor(&abi, &request(vec![]))?;
        assert!(
            check_constructor(&abi, &request(vec![Token::Bool(true)])).is_err()
        );

        Ok(())
    }
}
