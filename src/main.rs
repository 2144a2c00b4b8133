//! Kana Stream entry point
//!
//! The browser build drives the session from `requestAnimationFrame` and a
//! 25 ms audio timer. The native build runs a headless bot round on
//! simulated time and prints the final snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit, Element};

    use kana_stream::Session;
    use kana_stream::audio::{AudioScheduler, TICK_INTERVAL_MS, WebAudioBackend};
    use kana_stream::persistence::LocalStorageStore;
    use kana_stream::platform::{apply_action, command_for_key, parse_action};

    /// DOM event carrying the JSON snapshot for the renderer
    const FRAME_EVENT: &str = "kana-stream:frame";

    /// Session plus the handles of the two loops driving it
    struct Driver {
        session: Session<WebAudioBackend, LocalStorageStore>,
        frame_handle: Option<i32>,
        audio_handle: Option<i32>,
    }

    type Shared = Rc<RefCell<Driver>>;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Kana Stream starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let audio = AudioScheduler::new(WebAudioBackend::open, seed);
        let mut session = Session::new(audio, LocalStorageStore, seed);
        session.resize(viewport_width(&window), viewport_height(&window));

        let driver = Rc::new(RefCell::new(Driver {
            session,
            frame_handle: None,
            audio_handle: None,
        }));

        log::info!("Session created with seed: {}", seed);

        setup_click_handler(driver.clone());
        setup_keyboard(driver.clone());
        setup_resize(driver.clone());
        setup_auto_pause(driver.clone());

        publish(&driver);
    }

    fn viewport_width(window: &web_sys::Window) -> f32 {
        window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1280.0) as f32
    }

    fn viewport_height(window: &web_sys::Window) -> f32 {
        window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(720.0) as f32
    }

    /// Hand the current snapshot to the renderer
    fn publish(driver: &Shared) {
        let json = match serde_json::to_string(&driver.borrow().session.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Snapshot serialization failed: {}", e);
                return;
            }
        };
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(&json));
        if let Ok(event) = CustomEvent::new_with_event_init_dict(FRAME_EVENT, &init) {
            let _ = document.dispatch_event(&event);
        }
    }

    /// Start the loops the session wants and cancel the ones it doesn't
    fn reconcile(driver: &Shared) {
        let (wants_frames, wants_audio, frame_live, audio_live) = {
            let d = driver.borrow();
            (
                d.session.wants_frames(),
                d.session.wants_audio_ticks(),
                d.frame_handle.is_some(),
                d.audio_handle.is_some(),
            )
        };

        if wants_frames && !frame_live {
            request_frame(driver.clone());
        } else if !wants_frames {
            cancel_frame(driver);
        }

        if wants_audio && !audio_live {
            schedule_audio_tick(driver.clone());
        } else if !wants_audio {
            cancel_audio(driver);
        }
    }

    /// After any input: refresh loops and the rendered state
    fn after_input(driver: &Shared) {
        reconcile(driver);
        publish(driver);
    }

    fn request_frame(driver: Shared) {
        let window = web_sys::window().unwrap();
        let loop_driver = driver.clone();
        let closure = Closure::once(move |time: f64| {
            on_frame(loop_driver, time);
        });
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            driver.borrow_mut().frame_handle = Some(id);
        }
        closure.forget();
    }

    fn cancel_frame(driver: &Shared) {
        if let Some(id) = driver.borrow_mut().frame_handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn on_frame(driver: Shared, time: f64) {
        {
            let mut d = driver.borrow_mut();
            d.frame_handle = None;
            d.session.frame(time);
        }
        publish(&driver);
        reconcile(&driver);
    }

    fn schedule_audio_tick(driver: Shared) {
        let window = web_sys::window().unwrap();
        let loop_driver = driver.clone();
        let closure = Closure::once(move || {
            on_audio_tick(loop_driver);
        });
        if let Ok(id) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TICK_INTERVAL_MS as i32,
        ) {
            driver.borrow_mut().audio_handle = Some(id);
        }
        closure.forget();
    }

    fn cancel_audio(driver: &Shared) {
        if let Some(id) = driver.borrow_mut().audio_handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
        }
    }

    fn on_audio_tick(driver: Shared) {
        {
            let mut d = driver.borrow_mut();
            d.audio_handle = None;
            d.session.audio_tick();
        }
        reconcile(&driver);
    }

    /// Controls carry `data-action` and an optional `data-value`
    fn setup_click_handler(driver: Shared) {
        let document = web_sys::window().unwrap().document().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(control) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-action]").ok().flatten())
            else {
                return;
            };
            let Some(name) = control.get_attribute("data-action") else {
                return;
            };
            let value = control.get_attribute("data-value");
            let Some(action) = parse_action(&name, value.as_deref()) else {
                log::debug!("Unknown action: {}", name);
                return;
            };
            apply_action(&mut driver.borrow_mut().session, action);
            after_input(&driver);
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(driver: Shared) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let option_count = driver.borrow().session.snapshot().options.len();
            let Some(command) = command_for_key(&event.key(), option_count) else {
                return;
            };
            driver.borrow_mut().session.handle(command);
            after_input(&driver);
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(driver: Shared) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            driver
                .borrow_mut()
                .session
                .resize(viewport_width(&window), viewport_height(&window));
            publish(&driver);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(driver: Shared) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let driver = driver.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && driver.borrow_mut().session.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                    after_input(&driver);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if driver.borrow_mut().session.pause() {
                    log::info!("Auto-paused (window blur)");
                    after_input(&driver);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use kana_stream::audio::{AudioScheduler, OfflineDevice, TICK_INTERVAL_MS};
    use kana_stream::persistence::MemoryStore;
    use kana_stream::{Level, Session, Snapshot};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up on rounds longer than this much simulated time
    const MAX_ROUND_MS: f64 = 30.0 * 60.0 * 1000.0;
    /// Chance the bot picks the right reading
    const BOT_ACCURACY: f64 = 0.92;

    /// A player with a reaction delay and imperfect recall
    struct Bot {
        rng: Pcg32,
        watching: Option<u64>,
        wait_frames: u32,
    }

    impl Bot {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                watching: None,
                wait_frames: 0,
            }
        }

        /// Decide on an answer for this frame, if any
        fn pick(&mut self, snapshot: &Snapshot) -> Option<String> {
            let tile = snapshot.tiles.get(snapshot.active_index)?;
            if self.watching != Some(tile.id) {
                self.watching = Some(tile.id);
                self.wait_frames = self.rng.random_range(15..120);
            }
            if self.wait_frames > 0 {
                self.wait_frames -= 1;
                return None;
            }

            if self.rng.random_bool(BOT_ACCURACY) {
                return Some(tile.reading.to_string());
            }
            let wrong = snapshot
                .options
                .iter()
                .find(|o| o.reading != tile.reading)
                .map_or("?", |o| o.reading);
            Some(wrong.to_string())
        }
    }

    pub fn run(seed: u64, level: Level) {
        let device = OfflineDevice::new();
        let clock = device.clone();
        let audio = AudioScheduler::new(move || Ok(device.clone()), seed);
        let mut session = Session::new(audio, MemoryStore::new(), seed);
        session.resize(1280.0, 720.0);
        session.enter_setup(level);
        if let Err(e) = session.launch() {
            log::error!("Could not start round: {}", e);
            return;
        }

        let mut bot = Bot::new(seed.wrapping_add(1));
        let tick_ms = TICK_INTERVAL_MS as f64;
        let mut now_ms = 0.0;
        let mut next_frame = 0.0;
        let mut next_tick = 0.0;

        // Both clocks multiplexed on simulated time
        while session.wants_frames() && now_ms < MAX_ROUND_MS {
            let target = f64::min(next_frame, next_tick);
            clock.advance((target - now_ms) / 1000.0);
            now_ms = target;

            if next_tick <= next_frame {
                if session.wants_audio_ticks() {
                    session.audio_tick();
                }
                next_tick += tick_ms;
                continue;
            }

            session.frame(now_ms);
            if let Some(reading) = bot.pick(&session.snapshot()) {
                session.answer(&reading);
            }
            next_frame += FRAME_MS;
        }

        let snapshot = session.snapshot();
        log::info!(
            "Round finished after {:.1}s simulated: score {}, {} voices scheduled",
            now_ms / 1000.0,
            snapshot.score,
            clock.scheduled().len()
        );
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Snapshot serialization failed: {}", e),
        }
        session.shutdown();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as u64)
        });
    let level = args
        .next()
        .and_then(|s| s.parse::<u8>().ok())
        .and_then(kana_stream::Level::from_number)
        .unwrap_or_default();

    log::info!("Kana Stream (headless) seed {} level {:?}", seed, level);
    headless::run(seed, level);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
