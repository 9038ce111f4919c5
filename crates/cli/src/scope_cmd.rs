use std::sync::Arc;

use anyhow::Result;
use opchecklist_local_store::FileStore;
use opchecklist_view::profile::load_profile;
use opchecklist_view::{ChecklistGroupingView, ViewConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScopeArg {
    /// Only checklists assigned to my position
    Mine,
    /// Checklists for every position (oversight role only)
    All,
}

pub fn run_scope(set: Option<ScopeArg>) -> Result<()> {
    let store = Arc::new(FileStore::open()?);
    let profile = load_profile(store.as_ref());
    let mut view = ChecklistGroupingView::new(ViewConfig::new(""), profile, store, None);

    if let Some(scope) = set {
        view.set_show_all(scope == ScopeArg::All)?;
    }
    println!("{}", if view.show_all() { "all" } else { "mine" });
    Ok(())
}
