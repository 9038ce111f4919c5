use anyhow::Result;
use opchecklist_core::{Role, UserProfile};
use opchecklist_local_store::FileStore;
use opchecklist_view::profile::{load_profile, save_profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RoleArg {
    Member,
    Oversight,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Member => Role::Member,
            RoleArg::Oversight => Role::Oversight,
        }
    }
}

pub fn show_profile() -> Result<()> {
    let store = FileStore::open()?;
    print_profile(&load_profile(&store))
}

pub fn set_profile(positions: Option<String>, role: Option<RoleArg>) -> Result<()> {
    let store = FileStore::open()?;
    let mut profile = load_profile(&store);
    if let Some(raw) = positions {
        profile = UserProfile::from_position_list(&raw, profile.role);
    }
    if let Some(role) = role {
        profile.role = role.into();
    }
    save_profile(&store, &profile)?;
    print_profile(&profile)
}

fn print_profile(profile: &UserProfile) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}
