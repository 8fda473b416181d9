// Window setup - attributes and platform instance extensions
//
// Responsibilities:
// - Describe the single fixed-size application window
// - Name the instance extensions the window system integration needs

use std::ffi::CStr;

use ash::extensions::khr;
use winit::dpi::PhysicalSize;
use winit::window::WindowAttributes;

use crate::config::WindowConfig;

/// Attributes for the application window: fixed size, no resizing.
pub fn attributes(config: &WindowConfig) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
}

/// Instance extensions required to later present to a window on this
/// platform. Requested up front so the instance never needs recreating.
pub fn required_instance_extensions() -> Vec<&'static CStr> {
    let mut extensions = vec![khr::Surface::name()];

    #[cfg(target_os = "windows")]
    extensions.push(khr::Win32Surface::name());

    #[cfg(any(
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    ))]
    {
        extensions.push(khr::XlibSurface::name());
        extensions.push(khr::WaylandSurface::name());
    }

    extensions
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn attributes_carry_the_fixed_window_settings() {
        let config = WindowConfig::default();
        let attrs = attributes(&config);

        assert_eq!(attrs.title, "Vulkan Test");
        assert!(!attrs.resizable);
        assert_eq!(
            attrs.inner_size,
            Some(Size::Physical(PhysicalSize::new(800, 600)))
        );
    }

    #[test]
    fn extension_list_starts_with_the_core_surface_extension() {
        let extensions = required_instance_extensions();
        assert_eq!(extensions[0], khr::Surface::name());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn extension_list_covers_both_unix_window_systems() {
        let extensions = required_instance_extensions();
        assert!(extensions.contains(&khr::XlibSurface::name()));
        assert!(extensions.contains(&khr::WaylandSurface::name()));
    }
}
