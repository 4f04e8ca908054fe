//! Patrol Playground entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_shell {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        KeyboardEvent, MouseEvent, PointerEvent, TouchEvent,
    };

    use patrol_playground::Tuning;
    use patrol_playground::gaze::pupil_offset;
    use patrol_playground::sim::{Bounds, Facing, Frame, Scene, SceneEvent};

    /// Overlay canvas for ambient particles and confetti
    struct Overlay {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    /// DOM handles plus the scene they drive
    struct Shell {
        scene: Scene,
        playground: Element,
        shape: HtmlElement,
        overlay: Option<Overlay>,
        speed_range: Option<HtmlInputElement>,
        frame_pending: bool,
    }

    impl Shell {
        fn bounds(&self) -> Bounds {
            Bounds::new(
                self.playground.client_width() as f32,
                self.playground.client_height() as f32,
                self.shape.client_width() as f32,
                self.shape.client_height() as f32,
            )
        }

        fn speed(&self) -> f32 {
            self.speed_range
                .as_ref()
                .and_then(|input| input.value().parse().ok())
                .unwrap_or(1.0)
        }

        fn handle(&mut self, event: SceneEvent) {
            let bounds = self.bounds();
            self.scene.handle(event, &bounds);
        }

        fn resize_overlay(&self) {
            if let Some(overlay) = &self.overlay {
                overlay.canvas.set_width(self.playground.client_width().max(0) as u32);
                overlay.canvas.set_height(self.playground.client_height().max(0) as u32);
            }
        }

        /// Centre of the shape in playground coordinates
        fn shape_center(&self) -> (f32, f32) {
            let shape = self.shape.get_bounding_client_rect();
            let playground = self.playground.get_bounding_client_rect();
            (
                (shape.left() - playground.left() + shape.width() / 2.0) as f32,
                (shape.top() - playground.top() + shape.height() / 2.0) as f32,
            )
        }

        /// Redraw the sprite alone (used while the loop is stopped)
        fn redraw_sprite(&self) {
            let sprite = self.scene.motion().map(|m| *m.state());
            render(
                &self.shape,
                None,
                &Frame {
                    sprite,
                    particles: None,
                },
            );
        }
    }

    fn render(shape: &HtmlElement, overlay: Option<&Overlay>, frame: &Frame<'_>) {
        if let Some(sprite) = frame.sprite {
            let style = shape.style();
            let _ = style.set_property("--tx", &format!("{}px", sprite.pos.x));
            let _ = style.set_property("--ty", &format!("{}px", sprite.pos.y));
            let _ = style.set_property("--s", &sprite.scale.to_string());
        }

        let (Some(overlay), Some(particles)) = (overlay, frame.particles) else {
            return;
        };
        let ctx = &overlay.ctx;
        ctx.clear_rect(
            0.0,
            0.0,
            overlay.canvas.width() as f64,
            overlay.canvas.height() as f64,
        );

        for p in particles.ambient {
            ctx.begin_path();
            ctx.set_fill_style_str(&format!("rgba(255,255,255,{})", p.alpha));
            let _ = ctx.arc(p.pos.x as f64, p.pos.y as f64, p.radius as f64, 0.0, TAU);
            ctx.fill();
        }

        for c in particles.confetti {
            let size = c.size as f64;
            ctx.save();
            let _ = ctx.translate(c.pos.x as f64, c.pos.y as f64);
            let _ = ctx.rotate(c.rotation as f64);
            ctx.set_fill_style_str(&format!("#{:06x}", c.color));
            ctx.fill_rect(-size / 2.0, -size / 2.0, size, size * 0.6);
            ctx.restore();
        }
    }

    fn create_overlay(document: &web_sys::Document, playground: &Element) -> Option<Overlay> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .ok()?
            .dyn_into()
            .ok()?;
        canvas.set_class_name("playground-canvas");
        playground.append_child(&canvas).ok()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
        Some(Overlay { canvas, ctx })
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Patrol Playground starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let playground = document.get_element_by_id("playground");
        let shape = document
            .get_element_by_id("shape")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let (Some(playground), Some(shape)) = (playground, shape) else {
            log::warn!("playground or shape element not found, nothing to animate");
            return;
        };

        let overlay = create_overlay(&document, &playground);
        let mut tuning = Tuning::default();
        if overlay.is_none() {
            log::warn!("No 2d canvas available, skipping particle layer");
            tuning.layers.particles = false;
        }

        let speed_range = document
            .get_element_by_id("speedRange")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());

        let seed = js_sys::Date::now() as u64;
        let mut shell = Shell {
            scene: Scene::new(&tuning, &Bounds::default(), seed),
            playground,
            shape,
            overlay,
            speed_range,
            frame_pending: false,
        };
        shell.resize_overlay();
        // Layout is known now; place the sprite on the floor
        shell.handle(SceneEvent::Reset);
        shell.redraw_sprite();
        log::info!("Scene initialized with seed: {}", seed);

        let shell = Rc::new(RefCell::new(shell));
        setup_buttons(&document, shell.clone());
        setup_keyboard(shell.clone());
        setup_shape_input(shell.clone());
        setup_resize(shell.clone());
        setup_eyes(&document);

        schedule(shell);
        log::info!("Patrol Playground running!");
    }

    /// Request a frame unless one is already queued or nothing is animating
    fn schedule(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        {
            let mut s = shell.borrow_mut();
            if s.frame_pending || !s.scene.wants_frame() {
                return;
            }
            s.frame_pending = true;
        }
        let closure = Closure::once(move |time: f64| {
            frame_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        {
            let mut guard = shell.borrow_mut();
            let s = &mut *guard;
            s.frame_pending = false;
            let bounds = s.bounds();
            let speed = s.speed();
            let frame = s.scene.frame(time, &bounds, speed);
            render(&s.shape, s.overlay.as_ref(), &frame);
        }
        schedule(shell);
    }

    fn on_event(shell: &Rc<RefCell<Shell>>, event: SceneEvent) {
        shell.borrow_mut().handle(event);
        schedule(shell.clone());
    }

    fn setup_buttons(document: &web_sys::Document, shell: Rc<RefCell<Shell>>) {
        for (id, event) in [
            ("startBtn", SceneEvent::Start),
            ("pauseBtn", SceneEvent::Pause),
            ("resetBtn", SceneEvent::Reset),
        ] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("#{} not found", id);
                continue;
            };
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                on_event(&shell, event);
                if event == SceneEvent::Reset {
                    // Reset happens while stopped; draw the new position now
                    shell.borrow().redraw_sprite();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let scene_event = match event.key().as_str() {
                "ArrowRight" => SceneEvent::Nudge(Facing::Forward),
                "ArrowLeft" => SceneEvent::Nudge(Facing::Reverse),
                " " => SceneEvent::Toggle,
                _ if event.code() == "Space" => SceneEvent::Toggle,
                _ => return,
            };
            on_event(&shell, scene_event);
            if matches!(scene_event, SceneEvent::Nudge(_)) {
                shell.borrow().redraw_sprite();
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_shape_input(shell: Rc<RefCell<Shell>>) {
        let shape = shell.borrow().shape.clone();

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                on_event(&shell, SceneEvent::Press);
            });
            let _ = shape
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let (x, y) = shell.borrow().shape_center();
            on_event(&shell, SceneEvent::Burst { x, y });
        });
        let _ = shape.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut s = shell.borrow_mut();
            s.resize_overlay();
            let bounds = s.bounds();
            s.scene.on_resize(&bounds);
            s.redraw_sprite();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pupils follow the pointer; stateless apart from the DOM
    fn setup_eyes(document: &web_sys::Document) {
        let Ok(eyes) = document.query_selector_all(".eye") else {
            return;
        };
        if eyes.length() == 0 {
            return;
        }
        let eyes: Vec<Element> = (0..eyes.length())
            .filter_map(|i| eyes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        let eyes = Rc::new(eyes);
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let eyes = eyes.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                move_pupils(&eyes, event.client_x() as f32, event.client_y() as f32);
            });
            let _ = window
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let eyes = eyes.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                for pupil in eyes.iter().filter_map(pupil_of) {
                    let _ = pupil
                        .style()
                        .set_property("transform", "translate(-50%, -50%)");
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            if let Some(touch) = event.touches().get(0) {
                move_pupils(&eyes, touch.client_x() as f32, touch.client_y() as f32);
            }
        });
        let _ = window.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn pupil_of(eye: &Element) -> Option<HtmlElement> {
        eye.query_selector(".pupil").ok()??.dyn_into().ok()
    }

    fn move_pupils(eyes: &[Element], x: f32, y: f32) {
        for eye in eyes {
            let Some(pupil) = pupil_of(eye) else {
                continue;
            };
            let rect = eye.get_bounding_client_rect();
            let center = Vec2::new(
                (rect.left() + rect.width() / 2.0) as f32,
                (rect.top() + rect.height() / 2.0) as f32,
            );
            let offset = pupil_offset(center, rect.width() as f32, Vec2::new(x, y));
            let _ = pupil.style().set_property(
                "transform",
                &format!(
                    "translate(-50%, -50%) translate({}px, {}px)",
                    offset.x, offset.y
                ),
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_shell::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use patrol_playground::Tuning;
    use patrol_playground::sim::{Bounds, Facing, Scene, SceneEvent};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const DEMO_FRAMES: u32 = 12 * 60;

    /// Tuning from an optional JSON file, falling back to defaults
    pub fn load_tuning(path: Option<String>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                return Tuning::default();
            }
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    /// Scripted input for the headless session, keyed by frame index
    fn scripted_event(frame: u32) -> Option<SceneEvent> {
        match frame {
            0 => Some(SceneEvent::Start),
            90 => Some(SceneEvent::Press),
            200 => Some(SceneEvent::Nudge(Facing::Forward)),
            240 => Some(SceneEvent::Pause),
            300 => Some(SceneEvent::Press),
            600 => Some(SceneEvent::Reset),
            _ => None,
        }
    }

    /// Drive a scene with a simulated 60 Hz clock and log what happens
    pub fn run_demo(tuning: &Tuning) {
        let bounds = Bounds::new(640.0, 360.0, 48.0, 48.0);
        let mut scene = Scene::new(tuning, &bounds, 0x5eed);
        let mut was_running = false;
        let mut peak_confetti = 0;

        for i in 0..DEMO_FRAMES {
            if let Some(event) = scripted_event(i) {
                log::info!("frame {:>3}: {:?}", i, event);
                scene.handle(event, &bounds);
                if event == SceneEvent::Press {
                    if let Some(motion) = scene.motion() {
                        let c = motion.state().center(&bounds);
                        scene.handle(SceneEvent::Burst { x: c.x, y: c.y }, &bounds);
                    }
                }
            }

            let now = i as f64 * FRAME_MS;
            let frame = scene.frame(now, &bounds, 1.0);
            let sprite = frame.sprite;
            if let Some(particles) = frame.particles {
                peak_confetti = peak_confetti.max(particles.confetti.len());
            }

            let running = scene.is_motion_running();
            if running != was_running {
                log::info!("frame {:>3}: running = {}", i, running);
                was_running = running;
            }
            if i % 60 == 0 {
                if let Some(sprite) = sprite {
                    log::debug!(
                        "frame {:>3}: pos=({:.1}, {:.1}) vy={:.1} scale={:.3} {:?}",
                        i,
                        sprite.pos.x,
                        sprite.pos.y,
                        sprite.vy,
                        sprite.scale,
                        sprite.run
                    );
                }
            }
        }

        if let Some(particles) = scene.particles() {
            log::info!(
                "Ambient particles: {}, confetti remaining: {}, peak confetti: {}",
                particles.ambient().len(),
                particles.confetti().len(),
                peak_confetti
            );
        }
        if let Some(motion) = scene.motion() {
            match serde_json::to_string_pretty(motion.state()) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Could not serialize sprite state: {}", e),
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Patrol Playground (native) starting...");
    log::info!("Browser shell requires wasm32 - running headless demo session");

    let tuning = native::load_tuning(std::env::args().nth(1));
    native::run_demo(&tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
