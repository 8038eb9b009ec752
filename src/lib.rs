//! Crop Advisor - рекомендация культуры по обученным ML артефактам

pub mod advisor;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod server;
pub mod types;

pub use types::*;
pub use models::*;
pub use preprocessing::*;

// Re-export для удобства
pub use advisor::{CropAdvisor, FormData};
pub use artifacts::{ArtifactPaths, Artifacts};
pub use config::Config;
pub use error::{AdvisorError, ArtifactError, ModelError};
pub use server::{create_router, AppState};
