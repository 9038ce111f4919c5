use opchecklist_core::UserProfile;
use opchecklist_local_store::{KeyValueStore, PROFILE_KEY, read_json, write_json};
use tracing::warn;

use crate::error::Result;

/// Load the stored caller profile. Missing or unreadable entries yield the
/// default member profile with no positions.
pub fn load_profile(store: &dyn KeyValueStore) -> UserProfile {
    match read_json::<UserProfile>(store, PROFILE_KEY) {
        Ok(Some(profile)) => profile,
        Ok(None) => UserProfile::default(),
        Err(e) => {
            warn!("ignoring unreadable user profile: {e}");
            UserProfile::default()
        }
    }
}

pub fn save_profile(store: &dyn KeyValueStore, profile: &UserProfile) -> Result<()> {
    write_json(store, PROFILE_KEY, profile)?;
    Ok(())
}
