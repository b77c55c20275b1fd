//! adapter-iam - access token providers
//!
//! Provides short-lived database access tokens:
//! - Instance metadata service (service account attached to the instance)
//! - Static token for local development

pub mod error;
pub mod metadata;
pub mod static_token;

pub use metadata::{MetadataTokenProvider, TokenResponse, METADATA_FLAVOR_HEADER};
pub use static_token::StaticTokenProvider;
