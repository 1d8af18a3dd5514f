use eyre::ContextCompat;
use tracing::{info, instrument};

use self::orchestrator::{Orchestrator, PlanOutcome};
use self::plan::DeploymentPlan;
use self::variant::{select_variant, LightClientVariant};
use crate::cli::{Args, PrivateKey};
use crate::config::Config;
use crate::environment::{DryRunEnvironment, ForgeEnvironment};
use crate::error::DeployError;
use crate::report::Report;
use crate::serde_utils;

pub mod artifact;
pub mod orchestrator;
pub mod plan;
pub mod registry;
pub mod variant;

/// Lays out the validated plan for the selected light client
pub fn prepare_plan(
    variant: LightClientVariant,
    config: &Config,
) -> Result<DeploymentPlan, DeployError> {
    println!("Using TendermintZKLightClient: {}", variant.contract_name());

    let plan = DeploymentPlan::new(variant, config);
    plan.validate()?;

    Ok(plan)
}

#[instrument(skip_all)]
pub async fn run_deployment(args: Args) -> eyre::Result<()> {
    let variant = select_variant(args.light_client_variant.as_deref())?;
    let config = Config::load(args.config.as_deref()).await?;

    let plan = prepare_plan(variant, &config)?;

    let outcome = if args.dry_run {
        let deployer = args
            .private_key
            .as_ref()
            .map(PrivateKey::address)
            .unwrap_or_default();

        info!(?deployer, "Dry run, nothing is broadcast");

        let env = DryRunEnvironment::new(deployer);
        let outcome = Orchestrator::new(&env).run_plan(&plan).await?;

        info!(requests = env.requests().await.len(), "Dry run finished");

        outcome
    } else {
        let private_key = args.private_key.context("Missing private key")?;
        let rpc_url = args.rpc_url.context("Missing rpc url")?;

        let env = ForgeEnvironment::connect(
            args.contracts_dir,
            private_key,
            rpc_url,
            args.etherscan_api_key,
        )
        .await?;

        Orchestrator::new(&env).run_plan(&plan).await?
    };

    if let Some(report_path) = args.report {
        write_report(&report_path, &config, outcome).await?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}

async fn write_report(
    path: &std::path::Path,
    config: &Config,
    outcome: PlanOutcome,
) -> eyre::Result<()> {
    serde_utils::write_serialize(path, Report::new(config, outcome)).await
}
