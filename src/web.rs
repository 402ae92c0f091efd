//! Browser host (wasm32 only)
//!
//! The page creates a `WebArcade` for one game and calls `start` with a
//! callback. From then on keyboard listeners feed the round and every
//! animation frame hands the callback the snapshot as JSON; drawing stays in
//! the page. The restart key, layout/mode/auto-restart toggles and the
//! dark-mode preference are all reachable from JS.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::games::GameKind;
use crate::host::{EventLog, JsonRenderer, Session};
use crate::settings::{Preferences, Settings};
use crate::sim::{Game, Verdict};
use crate::Player;

struct WebHost {
    session: Session<Box<dyn Game>>,
    renderer: JsonRenderer,
    events: EventLog,
    on_frame: Option<js_sys::Function>,
    on_event: Option<js_sys::Function>,
    running: bool,
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // A second arcade on the page finds the logger already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

fn seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

fn player(index: u32) -> Option<Player> {
    Player::from_index(index as usize)
}

#[wasm_bindgen]
pub struct WebArcade {
    host: Rc<RefCell<WebHost>>,
}

#[wasm_bindgen]
impl WebArcade {
    /// `game` is one of jump, pong, sumo, reflex, math, words. `settings` is
    /// optional JSON; the dark-mode flag is taken from LocalStorage.
    #[wasm_bindgen(constructor)]
    pub fn new(
        game: &str,
        width: f32,
        height: f32,
        settings: Option<String>,
    ) -> Result<WebArcade, JsValue> {
        init_logging();
        let kind = GameKind::from_str(game)
            .ok_or_else(|| JsValue::from_str(&format!("unknown game: {}", game)))?;
        let mut settings = settings
            .as_deref()
            .and_then(Settings::from_json)
            .unwrap_or_default();
        settings.dark_mode = Preferences::load().dark_mode;

        log::info!("Arcade: {} {}x{}", kind.as_str(), width, height);
        let session = Session::new(kind.build(width, height), settings, seed());
        Ok(WebArcade {
            host: Rc::new(RefCell::new(WebHost {
                session,
                renderer: JsonRenderer::default(),
                events: EventLog::default(),
                on_frame: None,
                on_event: None,
                running: false,
            })),
        })
    }

    /// Attach keyboard listeners and start the animation-frame loop
    pub fn start(&self, on_frame: js_sys::Function, on_event: Option<js_sys::Function>) {
        {
            let mut host = self.host.borrow_mut();
            host.on_frame = Some(on_frame);
            host.on_event = on_event;
            if host.running {
                return;
            }
            host.running = true;
        }
        setup_keyboard(self.host.clone());
        setup_visibility(self.host.clone());
        request_animation_frame(self.host.clone());
    }

    pub fn stop(&self) {
        self.host.borrow_mut().running = false;
    }

    pub fn key_down(&self, key: &str, timestamp: f64) {
        self.host.borrow_mut().session.key_down(key, timestamp);
    }

    pub fn key_up(&self, key: &str, timestamp: f64) {
        self.host.borrow_mut().session.key_up(key, timestamp);
    }

    pub fn restart(&self) -> bool {
        self.host.borrow_mut().session.context_mut().restart()
    }

    /// Host verdict for quiz and word games (`player` 0 or 1)
    pub fn answer(&self, player_index: u32, correct: bool) -> bool {
        let Some(p) = player(player_index) else {
            log::warn!("No player {}", player_index);
            return false;
        };
        let verdict = if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        self.host.borrow_mut().session.context_mut().answer(p, verdict)
    }

    /// Answer that is neither right nor wrong (already used word)
    pub fn reject(&self, player_index: u32) -> bool {
        match player(player_index) {
            Some(p) => self
                .host
                .borrow_mut()
                .session
                .context_mut()
                .answer(p, Verdict::Rejected),
            None => false,
        }
    }

    pub fn toggle_key_layout(&self) -> String {
        let mut host = self.host.borrow_mut();
        let ctx = host.session.context_mut();
        let layout = ctx.settings().key_layout.toggled();
        ctx.set_key_layout(layout);
        layout.as_str().to_string()
    }

    pub fn toggle_player_mode(&self) -> String {
        let mut host = self.host.borrow_mut();
        let ctx = host.session.context_mut();
        let mode = ctx.settings().player_mode.toggled();
        ctx.set_player_mode(mode);
        mode.as_str().to_string()
    }

    pub fn toggle_auto_restart(&self) -> bool {
        let mut host = self.host.borrow_mut();
        let ctx = host.session.context_mut();
        let enabled = !ctx.settings().auto_restart;
        ctx.set_auto_restart(enabled);
        enabled
    }

    /// Flip and persist the theme flag
    pub fn toggle_dark_mode(&self) -> bool {
        let mut prefs = Preferences::load();
        prefs.toggle_dark_mode();
        self.host
            .borrow_mut()
            .session
            .context_mut()
            .set_dark_mode(prefs.dark_mode);
        prefs.dark_mode
    }

    pub fn settings_json(&self) -> String {
        self.host.borrow().session.context().settings().to_json()
    }

    pub fn snapshot_json(&self) -> String {
        let host = self.host.borrow();
        serde_json::to_string(&host.session.context().snapshot()).unwrap_or_default()
    }
}

fn setup_keyboard(host: Rc<RefCell<WebHost>>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if event.repeat() {
                return;
            }
            host.borrow_mut()
                .session
                .key_down(&event.key(), event.time_stamp());
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            host.borrow_mut()
                .session
                .key_up(&event.key(), event.time_stamp());
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn setup_visibility(host: Rc<RefCell<WebHost>>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let document_clone = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
            // Do not count the hidden time as one huge frame
            host.borrow_mut().session.suspend();
            log::info!("Resumed (tab visible)");
        }
    });
    let _ = document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn request_animation_frame(host: Rc<RefCell<WebHost>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(host, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(host: Rc<RefCell<WebHost>>, time: f64) {
    let (on_frame, on_event, snapshot, events) = {
        let mut guard = host.borrow_mut();
        if !guard.running {
            log::info!("Frame loop stopped");
            return;
        }
        let h = &mut *guard;
        h.session
            .frame(time / 1000.0, &mut h.renderer, &mut h.events);
        (
            h.on_frame.clone(),
            h.on_event.clone(),
            h.renderer.last().to_string(),
            std::mem::take(&mut h.events.events),
        )
    };

    // Borrow released: callbacks may call back into the arcade
    if let Some(callback) = on_event {
        for event in events {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
                }
                Err(e) => log::warn!("Event not serializable: {}", e),
            }
        }
    }
    if let Some(callback) = on_frame {
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&snapshot));
    }

    request_animation_frame(host);
}
