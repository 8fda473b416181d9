// =============================================================================
// CONFIGURATION - Fixed application settings
// =============================================================================
//
// The window size, title, and validation-layer setup live in one immutable
// struct built in main and handed down explicitly. Nothing is read from the
// command line, the environment, or a file.

use std::ffi::CStr;

/// The standard Khronos validation layer; all stock checks live behind it.
pub const KHRONOS_VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Root configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub window: WindowConfig,
    pub validation: ValidationConfig,
}

/// Window settings
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Test".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

/// Validation layer settings
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Whether to request the layers below at instance creation.
    pub enabled: bool,
    /// Requested layer names; every one must be present on the host.
    pub layers: Vec<&'static CStr>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            // Validation stays off in optimized builds.
            enabled: cfg!(debug_assertions),
            layers: vec![KHRONOS_VALIDATION_LAYER],
        }
    }
}
