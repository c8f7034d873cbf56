pub mod books;

use std::sync::Arc;

use bookbank_kernel::ModuleRegistry;

use books::AvailabilityTracker;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, tracker: Arc<AvailabilityTracker>) {
    registry.register(books::create_module(tracker));
}
