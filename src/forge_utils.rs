mod common;
mod create;
mod inspect_abi;

pub use self::common::{ContractSpec, ExternalDep};
pub use self::create::{ForgeCreate, ForgeOutput};
pub use self::inspect_abi::ForgeInspectAbi;
