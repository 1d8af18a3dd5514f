use ethers::types::Address;
use tracing::{info, instrument, warn};

use super::plan::{
    DeploymentPlan, DeploymentStep, PlanAction, StepArg, WiringCall,
};
use super::registry::ArtifactRegistry;
use super::variant::LightClientVariant;
use crate::environment::{
    CallRequest, CreateRequest, ExecutionEnvironment, LinkedLibrary,
};
use crate::error::DeployError;
use crate::report::WiringRecord;

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub variant: LightClientVariant,
    pub registry: ArtifactRegistry,
    pub wiring: Vec<WiringRecord>,
}

/// Executes a plan one action at a time against an environment.
///
/// The first failure aborts the run, nothing is retried.
pub struct Orchestrator<'a, E: ?Sized> {
    env: &'a E,
    registry: ArtifactRegistry,
    wiring: Vec<WiringRecord>,
}

impl<'a, E> Orchestrator<'a, E>
where
    E: ExecutionEnvironment + ?Sized,
{
    pub fn new(env: &'a E) -> Self {
        Self {
            env,
            registry: ArtifactRegistry::new(),
            wiring: vec![],
        }
    }

    #[instrument(skip_all, fields(artifact = %step.key, contract = %step.contract))]
    pub async fn deploy_artifact(
        &mut self,
        step: &DeploymentStep,
    ) -> Result<Address, DeployError> {
        let constructor_args = resolve_args(&step.args, &self.registry)?;

        let libraries = step
            .libraries
            .iter()
            .map(|library| {
                Ok(LinkedLibrary {
                    name: library.name.clone(),
                    source: library.source.clone(),
                    address: self.registry.address(library.artifact)?,
                })
            })
            .collect::<Result<Vec<_>, DeployError>>()?;

        let request = CreateRequest {
            contract: step.contract.clone(),
            constructor_args,
            libraries,
        };

        let deployment = self
            .env
            .create(&request)
            .await
            .map_err(|err| {
                DeployError::deployment(step.key, &step.contract, err)
            })?;

        let address = deployment.address;

        println!("{} address: {address:?}", step.contract);
        info!(?address, "Deployed");

        self.registry.record(step.key, deployment)?;

        Ok(address)
    }

    #[instrument(skip_all, fields(target = %call.target, method = %call.method))]
    pub async fn invoke_wiring(
        &mut self,
        call: &WiringCall,
    ) -> Result<(), DeployError> {
        let target = self.registry.get(call.target)?;

        let request = CallRequest {
            contract: target.contract.clone(),
            to: target.address,
            method: call.method.clone(),
            args: resolve_args(&call.args, &self.registry)?,
        };

        self.env
            .call(&request)
            .await
            .map_err(|err| {
                DeployError::wiring(call.target, &call.method, err)
            })?;

        info!("Wired");

        self.wiring.push(WiringRecord {
            target: call.target,
            address: request.to,
            method: request.method,
        });

        Ok(())
    }

    #[instrument(name = "run_plan", skip_all, fields(variant = %plan.variant))]
    pub async fn run_plan(
        mut self,
        plan: &DeploymentPlan,
    ) -> Result<PlanOutcome, DeployError> {
        plan.validate()?;

        if self.env.is_ephemeral() {
            warn!(
                "The target chain is ephemeral, every contract deployed \
                 now disappears together with it"
            );
        }

        for action in plan.actions() {
            match action {
                PlanAction::Deploy(step) => {
                    self.deploy_artifact(step).await?;
                }
                PlanAction::Wire(call) => {
                    self.invoke_wiring(call).await?;
                }
            }
        }

        Ok(PlanOutcome {
            variant: plan.variant,
            registry: self.registry,
            wiring: self.wiring,
        })
    }
}

fn resolve_args(
    args: &[StepArg],
    registry: &ArtifactRegistry,
) -> Result<Vec<ethers::abi::Token>, DeployError> {
    args.iter().map(|arg| arg.resolve(registry)).collect()
}
