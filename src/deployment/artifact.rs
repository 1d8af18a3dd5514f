use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Logical role of a deployed contract within the plan.
///
/// The light client is a single role whatever variant backs it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKey {
    IbcClient,
    IbcConnection,
    IbcChannelHandshake,
    IbcChannelPacketSendRecv,
    IbcChannelPacketTimeout,
    IbcHandler,
    ProtoMarshaler,
    LightClient,
    Erc20Token,
    Ics20Bank,
    Ics20TransferBank,
}

impl ArtifactKey {
    /// Logic contracts aggregated by the IBC handler, in constructor order
    pub const IBC_LOGIC: [(ArtifactKey, &'static str); 5] = [
        (ArtifactKey::IbcClient, "IBCClient"),
        (
            ArtifactKey::IbcConnection,
            "IBCConnectionSelfStateNoValidation",
        ),
        (ArtifactKey::IbcChannelHandshake, "IBCChannelHandshake"),
        (ArtifactKey::IbcChannelPacketSendRecv, "IBCChannelPacketSendRecv"),
        (ArtifactKey::IbcChannelPacketTimeout, "IBCChannelPacketTimeout"),
    ];
}
