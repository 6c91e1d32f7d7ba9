//! CLI command implementations.

pub(crate) mod show_config;
pub(crate) mod upload;

pub(crate) use upload::UploadArgs;
