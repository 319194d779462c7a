pub mod config;
pub mod helm;
pub mod installation;
pub mod meta;
pub mod scheme;

pub use config::ConfigSpec;
pub use installation::{
    Installation, InstallationList, InstallationSpec, InstallationState, InstallationStatus,
};
pub use scheme::{installation_scheme, Resource, Scheme};
