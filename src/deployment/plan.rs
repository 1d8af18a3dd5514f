use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use ethers::abi::Token;
use ethers::types::{H256, U256};

use super::artifact::ArtifactKey;
use super::registry::ArtifactRegistry;
use super::variant::LightClientVariant;
use crate::config::Config;
use crate::error::DeployError;

pub const PROTO_MARSHALER: &str = "TendermintZKLightClientProtoMarshaler";

#[derive(Debug, Clone, PartialEq)]
pub enum StepArg {
    Literal(Token),
    Artifact(ArtifactKey),
}

impl StepArg {
    pub fn string(value: impl ToString) -> Self {
        Self::Literal(Token::String(value.to_string()))
    }

    pub fn uint(value: impl Into<U256>) -> Self {
        Self::Literal(Token::Uint(value.into()))
    }

    pub fn bytes32(value: H256) -> Self {
        Self::Literal(Token::FixedBytes(value.as_bytes().to_vec()))
    }

    pub fn reference(&self) -> Option<ArtifactKey> {
        match self {
            Self::Literal(_) => None,
            Self::Artifact(key) => Some(*key),
        }
    }

    pub fn resolve(
        &self,
        registry: &ArtifactRegistry,
    ) -> Result<Token, DeployError> {
        match self {
            Self::Literal(token) => Ok(token.clone()),
            Self::Artifact(key) => Ok(Token::Address(registry.address(*key)?)),
        }
    }
}

/// Library whose address gets linked into the bytecode of a step
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryLink {
    pub name: String,
    pub source: PathBuf,
    pub artifact: ArtifactKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentStep {
    pub key: ArtifactKey,
    pub contract: String,
    pub args: Vec<StepArg>,
    pub libraries: Vec<LibraryLink>,
}

impl DeploymentStep {
    pub fn new(key: ArtifactKey, contract: impl ToString) -> Self {
        Self {
            key,
            contract: contract.to_string(),
            args: vec![],
            libraries: vec![],
        }
    }

    pub fn with_arg(mut self, arg: StepArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_library(
        mut self,
        name: impl ToString,
        source: impl AsRef<Path>,
        artifact: ArtifactKey,
    ) -> Self {
        self.libraries.push(LibraryLink {
            name: name.to_string(),
            source: source.as_ref().to_owned(),
            artifact,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WiringCall {
    pub target: ArtifactKey,
    pub method: String,
    pub args: Vec<StepArg>,
}

impl WiringCall {
    pub fn new(target: ArtifactKey, method: impl ToString) -> Self {
        Self {
            target,
            method: method.to_string(),
            args: vec![],
        }
    }

    pub fn with_arg(mut self, arg: StepArg) -> Self {
        self.args.push(arg);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    Deploy(DeploymentStep),
    Wire(WiringCall),
}

impl PlanAction {
    pub fn produces(&self) -> Option<ArtifactKey> {
        match self {
            Self::Deploy(step) => Some(step.key),
            Self::Wire(_) => None,
        }
    }

    pub fn references(&self) -> Vec<ArtifactKey> {
        match self {
            Self::Deploy(step) => step
                .args
                .iter()
                .filter_map(StepArg::reference)
                .chain(step.libraries.iter().map(|library| library.artifact))
                .collect(),
            Self::Wire(call) => std::iter::once(call.target)
                .chain(call.args.iter().filter_map(StepArg::reference))
                .collect(),
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deploy(step) => write!(f, "deploy {}", step.contract),
            Self::Wire(call) => write!(f, "{}.{}", call.target, call.method),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub variant: LightClientVariant,
    actions: Vec<PlanAction>,
}

impl DeploymentPlan {
    /// The full IBC deployment with the given light client behind it
    pub fn new(variant: LightClientVariant, config: &Config) -> Self {
        let mut actions = vec![];

        let mut ibc_handler =
            DeploymentStep::new(ArtifactKey::IbcHandler, "OwnableIBCHandler");
        for (key, contract) in ArtifactKey::IBC_LOGIC {
            actions
                .push(PlanAction::Deploy(DeploymentStep::new(key, contract)));
            ibc_handler = ibc_handler.with_arg(StepArg::Artifact(key));
        }
        actions.push(PlanAction::Deploy(ibc_handler));

        let light_client = &config.light_client;

        actions.push(PlanAction::Deploy(DeploymentStep::new(
            ArtifactKey::ProtoMarshaler,
            PROTO_MARSHALER,
        )));
        actions.push(PlanAction::Deploy(
            DeploymentStep::new(
                ArtifactKey::LightClient,
                variant.contract_name(),
            )
            .with_library(
                PROTO_MARSHALER,
                &light_client.proto_marshaler_source,
                ArtifactKey::ProtoMarshaler,
            )
            .with_arg(StepArg::Artifact(ArtifactKey::IbcHandler))
            .with_arg(StepArg::bytes32(light_client.step_verifier_digest))
            .with_arg(StepArg::bytes32(light_client.skip_verifier_digest))
            .with_arg(StepArg::uint(light_client.revision_number.0)),
        ));

        actions.push(PlanAction::Deploy(
            DeploymentStep::new(ArtifactKey::Erc20Token, "ERC20Token")
                .with_arg(StepArg::string(&config.token.name))
                .with_arg(StepArg::string(&config.token.symbol))
                .with_arg(StepArg::uint(config.token.initial_supply.0)),
        ));

        actions.push(PlanAction::Deploy(DeploymentStep::new(
            ArtifactKey::Ics20Bank,
            "ICS20Bank",
        )));

        actions.push(PlanAction::Deploy(
            DeploymentStep::new(
                ArtifactKey::Ics20TransferBank,
                "ICS20TransferBank",
            )
            .with_arg(StepArg::Artifact(ArtifactKey::IbcHandler))
            .with_arg(StepArg::Artifact(ArtifactKey::Ics20Bank)),
        ));

        actions.push(PlanAction::Wire(
            WiringCall::new(ArtifactKey::IbcHandler, "bindPort")
                .with_arg(StepArg::string(&config.transfer.port_id))
                .with_arg(StepArg::Artifact(ArtifactKey::Ics20TransferBank)),
        ));
        actions.push(PlanAction::Wire(
            WiringCall::new(ArtifactKey::IbcHandler, "registerClient")
                .with_arg(StepArg::string(&light_client.client_type))
                .with_arg(StepArg::Artifact(ArtifactKey::LightClient)),
        ));
        actions.push(PlanAction::Wire(
            WiringCall::new(ArtifactKey::Ics20Bank, "setOperator")
                .with_arg(StepArg::Artifact(ArtifactKey::Ics20TransferBank)),
        ));

        Self { variant, actions }
    }

    #[cfg(test)]
    pub fn from_actions(
        variant: LightClientVariant,
        actions: Vec<PlanAction>,
    ) -> Self {
        Self { variant, actions }
    }

    pub fn actions(&self) -> &[PlanAction] {
        &self.actions
    }

    /// Every reference must be produced by a strictly earlier step, and
    /// every artifact produced at most once.
    pub fn validate(&self) -> Result<(), DeployError> {
        let mut produced = HashSet::new();

        for action in &self.actions {
            for reference in action.references() {
                if !produced.contains(&reference) {
                    return Err(DeployError::InvalidPlan {
                        action: action.to_string(),
                        reference,
                    });
                }
            }

            if let Some(key) = action.produces() {
                if !produced.insert(key) {
                    return Err(DeployError::DuplicateArtifact(key));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn deploy_step(plan: &DeploymentPlan, key: ArtifactKey) -> &DeploymentStep {
        plan.actions()
            .iter()
            .find_map(|action| match action {
                PlanAction::Deploy(step) if step.key == key => Some(step),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn plan_is_ordered_for_every_variant() -> eyre::Result<()> {
        for variant in LightClientVariant::iter() {
            DeploymentPlan::new(variant, &Config::default()).validate()?;
        }

        Ok(())
    }

    #[test]
    fn every_artifact_is_deployed_once() {
        let plan = DeploymentPlan::new(
            LightClientVariant::Mock,
            &Config::default(),
        );

        let produced: Vec<_> =
            plan.actions().iter().filter_map(PlanAction::produces).collect();

        assert_eq!(produced.len(), ArtifactKey::iter().count());
        for key in ArtifactKey::iter() {
            assert!(produced.contains(&key), "{key} is never deployed");
        }
    }

    #[test]
    fn handler_aggregates_logic_in_order() {
        let plan = DeploymentPlan::new(
            LightClientVariant::Mock,
            &Config::default(),
        );

        let handler = deploy_step(&plan, ArtifactKey::IbcHandler);
        let expected: Vec<_> = ArtifactKey::IBC_LOGIC
            .iter()
            .map(|(key, _)| StepArg::Artifact(*key))
            .collect();

        assert_eq!(handler.contract, "OwnableIBCHandler");
        assert_eq!(handler.args, expected);
    }

    #[test]
    fn light_client_uses_variant_and_constants() {
        let config = Config::default();
        let plan = DeploymentPlan::new(LightClientVariant::Groth16, &config);

        let light_client = deploy_step(&plan, ArtifactKey::LightClient);

        assert_eq!(light_client.contract, "TendermintZKLightClientGroth16");
        assert_eq!(
            light_client.args,
            vec![
                StepArg::Artifact(ArtifactKey::IbcHandler),
                StepArg::bytes32(config.light_client.step_verifier_digest),
                StepArg::bytes32(config.light_client.skip_verifier_digest),
                StepArg::uint(0u64),
            ]
        );
        assert_eq!(
            light_client.libraries,
            vec![LibraryLink {
                name: PROTO_MARSHALER.to_string(),
                source: config.light_client.proto_marshaler_source.clone(),
                artifact: ArtifactKey::ProtoMarshaler,
            }]
        );
    }

    #[test]
    fn wiring_comes_last() {
        let plan = DeploymentPlan::new(
            LightClientVariant::Mock,
            &Config::default(),
        );

        let wiring: Vec<_> = plan
            .actions()
            .iter()
            .skip_while(|action| matches!(action, PlanAction::Deploy(_)))
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            wiring,
            vec![
                "ibc_handler.bindPort",
                "ibc_handler.registerClient",
                "ics20_bank.setOperator",
            ]
        );
    }

    #[test]
    fn forward_reference_is_rejected() {
        let plan = DeploymentPlan::from_actions(
            LightClientVariant::Mock,
            vec![
                PlanAction::Deploy(
                    DeploymentStep::new(
                        ArtifactKey::Ics20TransferBank,
                        "ICS20TransferBank",
                    )
                    .with_arg(StepArg::Artifact(ArtifactKey::Ics20Bank)),
                ),
                PlanAction::Deploy(DeploymentStep::new(
                    ArtifactKey::Ics20Bank,
                    "ICS20Bank",
                )),
            ],
        );

        let err = plan.validate().unwrap_err();

        assert!(matches!(
            err,
            DeployError::InvalidPlan {
                reference: ArtifactKey::Ics20Bank,
                ..
            }
        ));
    }

    #[test]
    fn unlinked_library_is_rejected() {
        let plan = DeploymentPlan::from_actions(
            LightClientVariant::Mock,
            vec![PlanAction::Deploy(
                DeploymentStep::new(ArtifactKey::LightClient, "Client")
                    .with_library(
                        PROTO_MARSHALER,
                        "Marshaler.sol",
                        ArtifactKey::ProtoMarshaler,
                    ),
            )],
        );

        assert!(matches!(
            plan.validate(),
            Err(DeployError::InvalidPlan {
                reference: ArtifactKey::ProtoMarshaler,
                ..
            })
        ));
    }

    #[test]
    fn self_reference_is_rejected() {
        let plan = DeploymentPlan::from_actions(
            LightClientVariant::Mock,
            vec![PlanAction::Deploy(
                DeploymentStep::new(ArtifactKey::Ics20Bank, "ICS20Bank")
                    .with_arg(StepArg::Artifact(ArtifactKey::Ics20Bank)),
            )],
        );

        assert!(plan.validate().is_err());
    }

    #[test]
    fn duplicate_artifact_is_rejected() {
        let bank = PlanAction::Deploy(DeploymentStep::new(
            ArtifactKey::Ics20Bank,
            "ICS20Bank",
        ));
        let plan = DeploymentPlan::from_actions(
            LightClientVariant::Mock,
            vec![bank.clone(), bank],
        );

        assert!(matches!(
            plan.validate(),
            Err(DeployError::DuplicateArtifact(ArtifactKey::Ics20Bank))
        ));
    }
}
