pub mod settings;
pub mod source;

pub use settings::RuntimeSettings;
pub use source::{ConfigBinding, SourceConfig};
