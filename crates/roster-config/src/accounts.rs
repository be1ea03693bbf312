//! Account registration defaults.

use roster_core::enums::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountsConfig {
    /// Role given to newly registered accounts that do not request one.
    #[serde(default)]
    pub default_role: Role,
}
