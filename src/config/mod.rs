//! Configuration: where files live and the user's preferences

pub mod paths;
pub mod settings;

pub use paths::SanityPaths;
pub use settings::Settings;
