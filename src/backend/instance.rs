// Vulkan instance ownership
//
// Responsibilities:
// - Verify requested validation layers before anything is created
// - Create the instance exactly once, with all parameters finalized
// - Route validation messages into the log facade
// - Destroy the messenger and the instance on drop

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ash::{vk, Entry};
use thiserror::Error;

use crate::config::Config;

const ENGINE_NAME: &CStr = c"No Engine";

/// Errors raised while establishing the connection to the driver.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The Vulkan loader could not be found or initialized.
    #[error("failed to load the Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    /// The driver rejected the layer query itself.
    #[error("failed to enumerate instance layers: {0}")]
    LayerEnumeration(vk::Result),

    /// A requested validation layer is not installed on this host.
    #[error("validation layers requested, but not available: {0}")]
    LayerUnavailable(String),

    /// The single instance-creation call failed.
    #[error("failed to create instance: {0}")]
    Creation(vk::Result),

    /// The debug messenger could not be installed.
    #[error("failed to set up debug messenger: {0}")]
    DebugMessenger(vk::Result),

    /// The configured application name has an interior NUL byte.
    #[error("invalid application name: {0}")]
    AppName(#[from] std::ffi::NulError),
}

/// Owns the process-wide Vulkan instance.
///
/// Drop destroys the debug messenger first, then the instance; the loader
/// entry is kept alive alongside so the destroy calls stay valid.
pub struct Instance {
    pub raw: ash::Instance,
    debug_utils: Option<(ash::extensions::ext::DebugUtils, vk::DebugUtilsMessengerEXT)>,
    entry: Entry,
}

impl Instance {
    /// Connect to the driver with the given window-system extensions enabled.
    ///
    /// Layers are verified before the creation call, so a missing layer
    /// fails without touching the driver further.
    pub fn new(config: &Config, extensions: &[&'static CStr]) -> Result<Self, InstanceError> {
        log::info!(
            "Creating Vulkan instance (validation {})",
            if config.validation.enabled { "on" } else { "off" }
        );

        let entry = unsafe { Entry::load() }?;

        if config.validation.enabled {
            check_layer_support(&entry, &config.validation.layers)?;
        }

        let raw = create_instance(&entry, config, extensions)?;

        // Wrap immediately so any failure below still destroys the instance.
        let mut instance = Self {
            raw,
            debug_utils: None,
            entry,
        };

        if config.validation.enabled {
            let debug_utils = instance.install_debug_messenger()?;
            instance.debug_utils = Some(debug_utils);
        }

        Ok(instance)
    }

    fn install_debug_messenger(
        &self,
    ) -> Result<(ash::extensions::ext::DebugUtils, vk::DebugUtilsMessengerEXT), InstanceError>
    {
        let debug_utils = ash::extensions::ext::DebugUtils::new(&self.entry, &self.raw);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(InstanceError::DebugMessenger)?;

        Ok((debug_utils, messenger))
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan instance...");

        // Cleanup in reverse order
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.raw.destroy_instance(None);
        }
    }
}

/// Verify every requested layer is present on the host.
fn check_layer_support(entry: &Entry, requested: &[&'static CStr]) -> Result<(), InstanceError> {
    let available = entry
        .enumerate_instance_layer_properties()
        .map_err(InstanceError::LayerEnumeration)?;
    log::debug!("Found {} instance layer(s)", available.len());

    match missing_layer(requested, &available) {
        Some(layer) => Err(InstanceError::LayerUnavailable(layer)),
        None => Ok(()),
    }
}

/// First requested layer absent from `available`, if any.
fn missing_layer(
    requested: &[&'static CStr],
    available: &[vk::LayerProperties],
) -> Option<String> {
    requested
        .iter()
        .find(|&&wanted| {
            !available.iter().any(|layer| {
                // layer_name is NUL-terminated by the loader.
                unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) == wanted }
            })
        })
        .map(|layer| layer.to_string_lossy().into_owned())
}

/// Build the creation parameters and perform the single creation call.
fn create_instance(
    entry: &Entry,
    config: &Config,
    extensions: &[&'static CStr],
) -> Result<ash::Instance, InstanceError> {
    let app_name = CString::new(config.window.title.as_str())?;

    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(ENGINE_NAME)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_0);

    let mut extension_names: Vec<*const c_char> =
        extensions.iter().map(|ext| ext.as_ptr()).collect();
    let mut layer_names: Vec<*const c_char> = Vec::new();

    if config.validation.enabled {
        extension_names.push(ash::extensions::ext::DebugUtils::name().as_ptr());
        layer_names.extend(config.validation.layers.iter().map(|layer| layer.as_ptr()));
    }

    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extension_names)
        .enabled_layer_names(&layer_names);

    unsafe { entry.create_instance(&create_info, None) }.map_err(InstanceError::Creation)
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
