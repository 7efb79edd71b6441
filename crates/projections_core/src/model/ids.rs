//! Identifiers for household entities
//!
//! Accounts carry two identifiers from the input: a numeric `AccountId` used
//! by manual debt-payment streams, and a string shadow key used by
//! cross-references such as an income's employer plan account. Both are kept
//! as distinct types so they can't be confused.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier for an account within a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

/// Stable external key for an account, assigned by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShadowKey(pub String);

impl fmt::Display for ShadowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShadowKey {
    fn from(s: &str) -> Self {
        ShadowKey(s.to_string())
    }
}

/// Which member of the household owns an account or stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    #[default]
    User,
    Spouse,
}
