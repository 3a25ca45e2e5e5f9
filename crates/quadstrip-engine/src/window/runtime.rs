use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::gfx::{GfxContext, WgpuBackend};
use crate::scene::{Notifier, SceneConfig, SceneInitializer};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "canvas".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and blocks until it is closed.
    ///
    /// The scene is initialized and drawn once, on the first redraw. A failed
    /// initialization ends the loop and is returned here.
    pub fn run(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        scene: SceneConfig,
        notifier: Box<dyn Notifier>,
    ) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, SceneInitializer::new(scene), notifier);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gfx: GfxContext<WgpuBackend<'this>>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    initializer: SceneInitializer,
    notifier: Box<dyn Notifier>,

    window: Option<WindowEntry>,
    initialized: bool,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        initializer: SceneInitializer,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            gpu_init,
            initializer,
            notifier,
            window: None,
            initialized: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntry::try_new(window, |w| {
            pollster::block_on(Gpu::new(w, gpu_init))
                .map(|gpu| GfxContext::new(WgpuBackend::new(gpu)))
        })
        .context("GPU initialization failed for window")
    }

    /// Runs the scene initializer. Only the first call does anything.
    fn initialize_scene(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        let Some(entry) = self.window.as_mut() else {
            return Ok(());
        };

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (initializer, notifier) = (&self.initializer, &mut self.notifier);

        entry.with_mut(|fields| {
            fields.window.pre_present_notify();
            initializer.initialize_or_alert(fields.gfx, notifier.as_mut())
        })?;

        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("failed to create initial window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Nothing animates; wake only for window events.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.initialize_scene() {
                    self.fail(event_loop, e.context("scene initialization failed"));
                }
            }

            _ => {}
        }
    }
}
