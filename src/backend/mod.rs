// Backend module - Vulkan abstraction layer
//
// Design: Thin wrapper around ash, split between instance ownership and
// physical device selection

pub mod device;
pub mod instance;

pub use device::pick_physical_device;
pub use instance::Instance;
