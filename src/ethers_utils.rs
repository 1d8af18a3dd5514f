use std::sync::Arc;

use ethers::abi::Tokenizable;
use ethers::prelude::{
    encode_function_data, Http, LocalWallet, Provider, SignerMiddleware,
};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, H256};
use eyre::{bail, Context, ContextCompat};
use tracing::{info, instrument};

// TODO: Allow for different wallet kinds
#[derive(Debug)]
pub struct RpcSigner(pub Arc<SignerMiddleware<Provider<Http>, LocalWallet>>);

pub struct Transaction<T> {
    abi: ethers::abi::Abi,
    function_name: String,
    args: T,
    signer: Arc<RpcSigner>,
    to: Address,
    nonce: u64,
}

#[derive(Clone, Debug)]
pub struct TransactionBuilder<T> {
    abi: Option<ethers::abi::Abi>,
    function_name: Option<String>,
    args: Option<T>,
    signer: Option<Arc<RpcSigner>>,
    to: Option<Address>,
    nonce: Option<u64>,
}

impl<T> Default for TransactionBuilder<T> {
    fn default() -> Self {
        Self {
            abi: None,
            function_name: None,
            args: None,
            signer: None,
            to: None,
            nonce: None,
        }
    }
}

impl<T> TransactionBuilder<T> {
    pub fn abi(mut self, abi: ethers::abi::Abi) -> Self {
        self.abi = Some(abi);
        self
    }

    pub fn function_name(mut self, function_name: impl ToString) -> Self {
        self.function_name = Some(function_name.to_string());
        self
    }

    pub fn args(mut self, args: T) -> Self {
        self.args = Some(args);
        self
    }

    pub fn signer(mut self, signer: Arc<RpcSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> eyre::Result<Transaction<T>> {
        Ok(Transaction {
            abi: self.abi.context("TransactionBuilder missing abi")?,
            function_name: self
                .function_name
                .context("TransactionBuilder missing function_name")?,
            args: self.args.context("TransactionBuilder missing args")?,
            signer: self.signer.context("TransactionBuilder missing signer")?,
            to: self.to.context("TransactionBuilder missing to")?,
            nonce: self.nonce.context("TransactionBuilder missing nonce")?,
        })
    }
}

impl<T> Transaction<T>
where
    T: Tokenizable,
{
    #[instrument(name = "transaction", skip_all, fields(function = %self.function_name, to = ?self.to))]
    pub async fn send(self) -> eyre::Result<H256> {
        let func = self.abi.function(&self.function_name)?;
        let call_data = encode_function_data(func, self.args)?;

        let mut tx = TypedTransaction::Eip1559(
            Eip1559TransactionRequest::new()
                .to(self.to)
                .data(call_data)
                .nonce(self.nonce),
        );

        self.signer.0.fill_transaction(&mut tx, None).await?;

        let tx = self
            .signer
            .0
            .send_transaction(tx, None)
            .await
            .context("Send transaction")?;

        let receipt = tx
            .await
            .context("Awaiting receipt")?
            .context("Failed to execute")?;

        if receipt.status != Some(1.into()) {
            bail!(
                "Transaction {:?} reverted calling {}",
                receipt.transaction_hash,
                self.function_name
            );
        }

        info!(hash = ?receipt.transaction_hash, "Transaction confirmed");

        Ok(receipt.transaction_hash)
    }
}
