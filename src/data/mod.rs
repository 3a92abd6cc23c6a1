pub mod loader;
pub mod synthetic;
pub mod transformer;

pub use loader::*;
pub use synthetic::*;
pub use transformer::*;
