use std::path::PathBuf;

use clap::Parser;

pub mod private_key;

pub use private_key::PrivateKey;
use reqwest::Url;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case", version, about)]
pub struct Args {
    /// Light client implementation to deploy
    ///
    /// One of `mock`, `groth16` or `groth16-commitment`. There is no default,
    /// the value must always be given explicitly.
    #[clap(short, long, env = "TM_ZK_PS")]
    pub light_client_variant: Option<String>,

    /// Path to the deployment configuration file
    ///
    /// Built-in defaults are used for every missing section
    #[clap(short, long, env)]
    pub config: Option<PathBuf>,

    /// Root of the forge project holding the contracts
    #[clap(long, env, default_value = ".")]
    pub contracts_dir: PathBuf,

    /// Private key to use for the deployment
    #[clap(short, long, env, required_unless_present = "dry_run")]
    pub private_key: Option<PrivateKey>,

    /// The RPC Url to use for the deployment
    #[clap(short, long, env, required_unless_present = "dry_run")]
    pub rpc_url: Option<Url>,

    /// The etherscan API key to use
    #[clap(short, long, env)]
    pub etherscan_api_key: Option<String>,

    /// Where to write the deployment report once every step succeeded
    #[clap(long, env)]
    pub report: Option<PathBuf>,

    /// Run the plan against an in-memory environment without touching any chain
    #[clap(long)]
    pub dry_run: bool,
}
