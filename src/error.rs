use thiserror::Error;

use crate::deployment::artifact::ArtifactKey;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{} (expected one of {expected})", selector_problem(.value))]
    Configuration { value: Option<String>, expected: String },

    #[error("{action} references {reference} before it is deployed")]
    InvalidPlan {
        action: String,
        reference: ArtifactKey,
    },

    #[error("{0} is deployed more than once")]
    DuplicateArtifact(ArtifactKey),

    #[error("No deployment recorded for {0}")]
    UnresolvedReference(ArtifactKey),

    #[error("Failed to deploy {contract} ({artifact})")]
    Deployment {
        artifact: ArtifactKey,
        contract: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to call {method} on {target}")]
    Wiring {
        target: ArtifactKey,
        method: String,
        #[source]
        source: BoxError,
    },
}

impl DeployError {
    pub fn deployment(
        artifact: ArtifactKey,
        contract: impl ToString,
        source: eyre::Report,
    ) -> Self {
        Self::Deployment {
            artifact,
            contract: contract.to_string(),
            source: source.into(),
        }
    }

    pub fn wiring(
        target: ArtifactKey,
        method: impl ToString,
        source: eyre::Report,
    ) -> Self {
        Self::Wiring {
            target,
            method: method.to_string(),
            source: source.into(),
        }
    }
}

fn selector_problem(value: &Option<String>) -> String {
    const SOURCES: &str = "`--light-client-variant` / `TM_ZK_PS`";

    match value {
        Some(value) => {
            format!("Unrecognized light client variant ({SOURCES}): {value:?}")
        }
        None => format!("No light client variant given ({SOURCES})"),
    }
}
