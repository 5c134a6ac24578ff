use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc
};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{
        ActiveEventLoop,
        ControlFlow,
        EventLoop
    },
    keyboard::PhysicalKey,
    window::{
        Window,
        WindowId
    }
};

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    game::world::World,
    input::Input,
    rendering::{renderer::Renderer, DrawList}
};

/// Frame driver: owns the window, the renderer and the world.
///
/// Every redraw ticks the world into a fresh [`DrawList`], presents it and
/// then clears the per-frame input edges.
pub struct App {
    config: EngineConfig,
    world: World,
    input: Input,
    frame: DrawList,
    renderer: Option<Renderer>,
    shutdown_requested: Arc<AtomicBool>,
    error: Option<EngineError>,
}

impl App {
    pub fn new(config: EngineConfig, world: World) -> Self {
        Self {
            config,
            world,
            input: Input::new(),
            frame: DrawList::new(),
            renderer: None,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            error: None,
        }
    }

    /// Flag that stops the event loop on the next frame once set.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown_requested.clone()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        self.frame.clear();

        if let Err(e) = self.world.tick(&self.input, &mut self.frame) {
            match e {
                EngineError::Tick { failures } => {
                    for failure in failures {
                        log::error!("Frame failure: {failure}");
                    }
                },
                other => log::error!("Frame failure: {other}"),
            }
        }

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.frame, self.config.clear_color)?;
            renderer.get_window().request_redraw();
        }

        self.input.end_frame();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(self.config.window_width, self.config.window_height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, EngineError::Window(e.to_string()));
                return;
            },
        };

        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                self.fail(event_loop, e);
                return;
            },
        }

        if let Err(e) = self.world.start() {
            log::error!("World start failed: {e}");
        }

        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                event_loop.exit();
            },
            WindowEvent::Focused(false) => {
                self.input.release_all();
            },
            WindowEvent::RedrawRequested => {
                if self.shutdown_requested.load(Ordering::Relaxed) {
                    log::info!("Shutdown requested; stopping");
                    event_loop.exit();
                    return;
                }

                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            },
            WindowEvent::Resized(size) => {
                // Always followed by a redraw request.
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            },
            WindowEvent::KeyboardInput { device_id: _, event, is_synthetic: _ } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.handle_key(code, event.state, event.repeat);
                }
            },
            _ => (),
        }
    }
}

/// Opens the window and drives `world` until the window closes or Ctrl-C.
pub fn run(config: EngineConfig, world: World) -> Result<()> {
    config.validate()?;

    let event_loop = EventLoop::new()
        .map_err(|e| EngineError::Window(e.to_string()))?;

    // Games redraw continuously.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, world);

    let shutdown_flag = app.shutdown_flag();
    ctrlc::set_handler(move || {
        log::info!("Captured ctrl-C, shutting down...");
        shutdown_flag.store(true, Ordering::Relaxed);
    }).map_err(|e| EngineError::Window(format!("could not set Ctrl-C handler, reason='{e}'")))?;

    event_loop.run_app(&mut app)
        .map_err(|e| EngineError::Window(e.to_string()))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
