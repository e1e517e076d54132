//! Authorization guard for protected operations.

use crate::db::Principal;
use crate::{CabinetError, Result};

/// Require an authenticated principal.
///
/// Protected operations call this before doing anything else, so a
/// rejected request has no side effects.
pub fn require(principal: Option<Principal>) -> Result<Principal> {
    principal.ok_or(CabinetError::Unauthenticated)
}
