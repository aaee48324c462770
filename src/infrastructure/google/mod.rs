pub mod auth;
pub mod error;

pub use auth::{
    AccessTokenProvider, MetadataServerTokenProvider, ServiceAccountTokenProvider,
    StaticTokenProvider,
};
pub use error::GoogleApiError;
