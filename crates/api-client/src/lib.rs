pub mod client;
pub mod retry;

pub use client::ApiClient;
pub use opchecklist_core;
pub use retry::RetryConfig;
