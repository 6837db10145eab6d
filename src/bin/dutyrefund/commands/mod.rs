pub mod profile;
pub mod run;

use std::path::Path;

use dutyrefund::core::ClientProfile;

/// Profile from a JSON file, or the default Dutch-broker profile.
pub fn load_profile(path: Option<&Path>) -> anyhow::Result<ClientProfile> {
    match path {
        Some(path) => ClientProfile::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load profile {}: {}", path.display(), e)),
        None => Ok(ClientProfile::default()),
    }
}
