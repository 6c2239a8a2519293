//! Apple Catch entry point
//!
//! In the browser this runs either demo in a canvas (`?demo=triangle` picks
//! the hello triangle). Natively it runs the catch game headless on
//! autopilot and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use apple_catch::consts::*;
    use apple_catch::input::{Key, KeyAction, Keys};
    use apple_catch::renderer::{GpuRenderer, projection_for, render_game};
    use apple_catch::resources::{self, ResourceManager, ShaderKind};
    use apple_catch::sim::triangle::{TRIANGLE_CLEAR, TRIANGLE_COLOR, TriangleMover};
    use apple_catch::sim::{FixedStep, GameEvent, GameState, TickInput, autopilot, tick};
    use apple_catch::Settings;

    /// Clear color behind the catch game's background sprite
    const GAME_CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    struct CatchGame {
        state: GameState,
        resources: ResourceManager,
        clock: FixedStep,
        idle_mode: bool,
    }

    struct TriangleDemo {
        mover: TriangleMover,
        resources: ResourceManager,
    }

    enum Demo {
        Catch(CatchGame),
        Triangle(TriangleDemo),
    }

    /// Everything the frame loop touches
    struct App {
        demo: Demo,
        renderer: GpuRenderer,
        keys: Keys,
        last_time: f64,
        closed: bool,
    }

    impl App {
        fn on_key(&mut self, key: Key, action: KeyAction) {
            self.keys.apply(key, action);

            match &mut self.demo {
                Demo::Triangle(demo) => {
                    demo.mover.on_key(key, action);
                    if demo.mover.close_requested {
                        self.closed = true;
                    }
                }
                Demo::Catch(game) => match (key, action) {
                    (Key::Idle, KeyAction::Press) => {
                        game.idle_mode = !game.idle_mode;
                        log::info!("Idle mode: {}", game.idle_mode);
                    }
                    (Key::Escape, KeyAction::Press) => self.closed = true,
                    _ => {}
                },
            }
        }

        /// Advance the active demo by one animation frame
        fn update(&mut self, dt: f32) {
            match &mut self.demo {
                Demo::Triangle(demo) => demo.mover.step(),
                Demo::Catch(game) => {
                    let steps = game.clock.advance(dt);
                    for _ in 0..steps {
                        let input = if game.idle_mode {
                            autopilot(&game.state)
                        } else {
                            TickInput::from_keys(&self.keys)
                        };
                        tick(&mut game.state, &input, SIM_DT);
                    }

                    let events = game.state.drain_events();
                    if events.iter().any(|e| *e != GameEvent::Launched) {
                        update_hud(&game.state);
                    }
                }
            }
        }

        /// Focus lost: keyup never arrives for keys held while unfocused, and
        /// the time away must not be replayed as a burst of steps
        fn on_blur(&mut self) {
            self.keys.clear();
            if let Demo::Catch(game) = &mut self.demo {
                game.clock.reset();
            }
        }

        /// Draw the current frame
        fn render(&mut self) {
            let clear = match &self.demo {
                Demo::Triangle(demo) => {
                    if let Err(e) = demo
                        .resources
                        .require_shader(resources::FLAT_SHADER, ShaderKind::Flat)
                    {
                        log::error!("Cannot draw frame: {}", e);
                        self.closed = true;
                        return;
                    }
                    self.renderer
                        .draw_triangles(&demo.mover.world_vertices(), TRIANGLE_COLOR);
                    TRIANGLE_CLEAR
                }
                Demo::Catch(game) => {
                    if let Err(e) = render_game(&game.state, &game.resources, &mut self.renderer) {
                        log::error!("Cannot draw frame: {}", e);
                        self.closed = true;
                        return;
                    }
                    GAME_CLEAR
                }
            };

            match self.renderer.present(clear) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = self.renderer.size;
                    self.renderer.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(state: &GameState) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.query_selector("#hud-catches .hud-value").ok().flatten() {
            el.set_text_content(Some(&state.collisions().to_string()));
        }
        if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
            el.set_text_content(Some(&state.best_streak.to_string()));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Apple Catch starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let query = window.location().search().unwrap_or_default();
        let triangle = query.contains("demo=triangle");

        let settings = Settings::load();

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut renderer = match GpuRenderer::new(surface, &adapter, width, height).await {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let mut resources = ResourceManager::new();
        let shader_key = if triangle {
            resources.load_triangle_assets();
            resources::FLAT_SHADER
        } else {
            resources.load_game_assets(&mut renderer);
            resources::SPRITE_SHADER
        };
        match resources.shader(shader_key) {
            Ok(kind) => {
                let field = settings.tuning().field;
                renderer.set_projection(projection_for(kind, field));
            }
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        }

        let demo = if triangle {
            log::info!("Running hello triangle");
            Demo::Triangle(TriangleDemo {
                mover: TriangleMover::new(),
                resources,
            })
        } else {
            let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
            let state = GameState::new(settings.tuning(), seed);
            update_hud(&state);
            log::info!("Game initialized with seed: {}", seed);
            Demo::Catch(CatchGame {
                state,
                resources,
                clock: FixedStep::new(),
                idle_mode: settings.idle_mode,
            })
        };

        let app = Rc::new(RefCell::new(App {
            demo,
            renderer,
            keys: Keys::new(),
            last_time: 0.0,
            closed: false,
        }));

        setup_input_handlers(app.clone());

        // Start game loop
        request_animation_frame(app);

        log::info!("Apple Catch running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down (and auto-repeat)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    event.prevent_default();
                    let action = if event.repeat() {
                        KeyAction::Repeat
                    } else {
                        KeyAction::Press
                    };
                    app.borrow_mut().on_key(key, action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    app.borrow_mut().on_key(key, KeyAction::Release);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().on_blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();

            if a.closed {
                log::info!("Closed");
                return;
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), apple_catch::ResourceError> {
    use apple_catch::renderer::{SpriteRenderer, TextureHandle, TextureImage, render_game};
    use apple_catch::sim::{FixedStep, GameEvent, GameState, autopilot, tick};
    use apple_catch::{ResourceManager, Settings, consts::SIM_DT};
    use glam::Vec2;

    /// Counts draws instead of touching a GPU
    #[derive(Default)]
    struct HeadlessRenderer {
        textures: u32,
        draws: u64,
    }

    impl SpriteRenderer for HeadlessRenderer {
        fn upload_texture(&mut self, _image: &TextureImage) -> TextureHandle {
            self.textures += 1;
            TextureHandle(self.textures - 1)
        }

        fn draw_sprite(&mut self, _texture: TextureHandle, _position: Vec2, _size: Vec2, _rotation_deg: f32) {
            self.draws += 1;
        }
    }

    env_logger::init();
    log::info!("Apple Catch (native) starting...");
    log::info!("Native mode runs headless on autopilot - run with `trunk serve` for the web version");

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    let mut renderer = HeadlessRenderer::default();
    let mut resources = ResourceManager::new();
    resources.load_game_assets(&mut renderer);

    let mut state = GameState::new(settings.tuning(), seed);
    let mut clock = FixedStep::new();
    log::info!("Game initialized with seed: {}", seed);

    let frame_dt = 1.0 / 60.0;
    let (mut caught, mut resets, mut spoiled_dropped) = (0u32, 0u32, 0u32);
    for _ in 0..settings.headless_frames {
        for _ in 0..clock.advance(frame_dt) {
            let input = autopilot(&state);
            tick(&mut state, &input, SIM_DT);
        }
        for event in state.drain_events() {
            match event {
                GameEvent::Caught { .. } => caught += 1,
                GameEvent::SpoiledCaught | GameEvent::Dropped => resets += 1,
                GameEvent::SpoiledDropped { .. } => spoiled_dropped += 1,
                GameEvent::Launched => {}
            }
        }
        render_game(&state, &resources, &mut renderer)?;
    }

    log::info!(
        "Ran {} frames: {} caught, {} spoiled dodged, {} resets, best streak {} ({} sprites drawn)",
        settings.headless_frames,
        caught,
        spoiled_dropped,
        resets,
        state.best_streak,
        renderer.draws
    );

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
