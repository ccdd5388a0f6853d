use log::warn;

use crate::control_plane::ControlPlane;

/// The outcome of looking up an image pull secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretLookup {
    /// No secret name is configured, so no lookup was made.
    NotConfigured,
    Found,
    NotFound,
    /// The lookup itself failed (e.g. permission or network errors).
    Failed(String),
}

impl SecretLookup {
    pub fn is_present(&self) -> bool {
        matches!(self, SecretLookup::Found)
    }
}

pub async fn lookup_secret(control_plane: &dyn ControlPlane, name: &str) -> SecretLookup {
    if name.is_empty() {
        return SecretLookup::NotConfigured;
    }
    match control_plane.get_secret(name).await {
        Ok(Some(_)) => SecretLookup::Found,
        Ok(None) => SecretLookup::NotFound,
        Err(e) => SecretLookup::Failed(e.to_string()),
    }
}

/// Returns whether the named secret exists.
///
/// A failed lookup is reported as an absent secret, the same as a missing one.
/// Use [`lookup_secret`] to tell the two apart.
pub async fn is_secret_present(control_plane: &dyn ControlPlane, name: &str) -> bool {
    match lookup_secret(control_plane, name).await {
        SecretLookup::Failed(e) => {
            warn!("failed to look up secret {name}, treating it as absent: {e}");
            false
        }
        x => x.is_present(),
    }
}
