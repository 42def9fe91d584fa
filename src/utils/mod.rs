pub mod error;
pub mod logger;
pub mod metrics;
pub mod template;
pub mod validation;
