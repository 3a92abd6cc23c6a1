pub mod landscape;
pub mod metrics;

pub use landscape::*;
pub use metrics::*;
