// =============================================================================
// VULKAN TEST - Window, instance, and physical device bootstrap
// =============================================================================
//
// The earliest stage of a Vulkan application: open a fixed-size window,
// connect to the driver (with validation layers in debug builds), pick the
// most capable GPU, then idle until the window is closed.
//
// STARTUP FLOW:
// 1. Build the immutable configuration
// 2. Create the window
// 3. Create the Vulkan instance (validation layers verified first)
// 4. Select the physical device by score
// 5. Poll window events until close is requested
//
// No rendering happens here. The selected device is held, unused, for the
// lifetime of the application.
//
// =============================================================================

mod backend;
mod config;
mod window;

use anyhow::{Context, Result};
use ash::vk;
use backend::{pick_physical_device, Instance};
use config::Config;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    init_logging();

    let config = Config::default();
    log::info!("Starting Vulkan test application");
    log::info!(
        "Window: {}x{} (\"{}\")",
        config.window.width,
        config.window.height,
        config.window.title
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop error")?;

    app.into_result()
}

/// Initialize logging, defaulting to info level unless RUST_LOG overrides it
fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Idle-loop states. The only transition is Running -> CloseRequested,
/// triggered by the window's close control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    CloseRequested,
}

impl LoopState {
    /// Apply a close request. True only for the first request.
    fn request_close(&mut self) -> bool {
        match self {
            LoopState::Running => {
                *self = LoopState::CloseRequested;
                true
            }
            LoopState::CloseRequested => false,
        }
    }
}

/// Main application struct holding all acquired resources.
struct App {
    config: Config,

    // ─────────────────────────────────────────────────────────────────────────
    // ACQUIRED RESOURCES
    // ─────────────────────────────────────────────────────────────────────────
    vulkan: Option<Instance>,
    window: Option<Window>,
    /// Selected GPU; valid only while `vulkan` lives.
    physical_device: Option<vk::PhysicalDevice>,

    // ─────────────────────────────────────────────────────────────────────────
    // LOOP STATE
    // ─────────────────────────────────────────────────────────────────────────
    state: LoopState,
    /// First fatal initialization error; surfaced by main after the loop
    /// exits so the process still fails with a non-zero code.
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            vulkan: None,
            window: None,
            physical_device: None,
            state: LoopState::Running,
            init_error: None,
        }
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Connect to the driver and select the physical device.
    fn init_vulkan(&mut self) -> Result<()> {
        log::info!("Initializing Vulkan...");

        let extensions = window::required_instance_extensions();
        let instance = Instance::new(&self.config, &extensions)
            .context("Failed to initialize Vulkan")?;

        let physical_device = pick_physical_device(&instance.raw)
            .context("Failed to select a physical device")?;

        self.vulkan = Some(instance);
        self.physical_device = Some(physical_device);

        log::info!("Vulkan initialized successfully!");
        Ok(())
    }

    /// Record a fatal error and leave the event loop. Reporting is left to
    /// main, so the message reaches stderr exactly once.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        if self.init_error.is_none() {
            self.init_error = Some(error);
        }
        event_loop.exit();
    }

    /// The first recorded fatal error, if any.
    fn into_result(mut self) -> Result<()> {
        match self.init_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop
            .create_window(window::attributes(&self.config.window))
            .context("Failed to create window")
        {
            Ok(window) => window,
            Err(error) => {
                self.fail(event_loop, error);
                return;
            }
        };

        if let Err(error) = self.init_vulkan() {
            self.fail(event_loop, error);
            return;
        }

        self.window = Some(window);
    }

    /// Handle window events. Only the close control does anything.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if self.state.request_close() {
                    log::info!("Close requested, shutting down...");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for App {
    fn drop(&mut self) {
        log::info!("Cleaning up...");

        // Release in reverse order of acquisition. The device handle needs no
        // destroy call of its own; it dies with the instance.
        self.physical_device.take();
        self.vulkan.take();
        self.window.take();

        log::info!("Cleanup complete");
    }
}

// =============================================================================
// TESTS
// =============================================================================
