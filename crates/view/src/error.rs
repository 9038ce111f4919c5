use opchecklist_local_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to fetch checklists: {0}")]
    Fetch(String),
    #[error("only oversight users can show checklists for all positions")]
    NotPermitted,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ViewError>;
