//! Core traits, settings, and module registry for bookbank.

pub mod clock;
pub mod module;
pub mod registry;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
