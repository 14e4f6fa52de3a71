//! Service layer
//!
//! Services contain the worker's business logic: deciding which edge
//! backend to use and turning a job into an output image.
//!
//! All services are trait-based to enable testing and dependency injection.

mod device;
mod pipeline;

// Re-export traits
pub use device::DeviceProbe;
pub use pipeline::ProcessingService;

// Re-export implementations
pub use device::{AcceleratorMode, SystemDeviceProbe};
pub use pipeline::{EdgePipeline, ProcessedJob};
