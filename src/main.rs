//! Neon Storm entry point
//!
//! The browser build drives a [`Session`] from `requestAnimationFrame`, feeds
//! each snapshot to the page's renderer and writes the status widgets. The
//! native build runs a headless autopilot session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent};

    use neon_storm::audio::{AudioManager, MusicTrack};
    use neon_storm::leaderboard::{HighScores, ScoreSubmission, format_rows, parse_rows};
    use neon_storm::persistence::LocalStorageStore;
    use neon_storm::platform::BrowserClock;
    use neon_storm::sim::{Hud, TickInput};
    use neon_storm::theme::{CATALOG, Profile};
    use neon_storm::{Session, Settings};

    // Hand-off points to the page: the canvas renderer, the score uploader
    // and the remote table fetch
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (window.neonStormRender) window.neonStormRender(JSON.parse(json));
        }

        export function upload_score(json) {
            if (window.neonStormSubmit) window.neonStormSubmit(json);
        }

        export function request_leaderboard(done) {
            if (!window.neonStormFetchLeaderboard) return;
            Promise.resolve(window.neonStormFetchLeaderboard())
                .then((rows) => done(typeof rows === 'string' ? rows : JSON.stringify(rows)))
                .catch((e) => console.warn('Leaderboard fetch failed', e));
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
        fn upload_score(json: &str);
        fn request_leaderboard(done: JsValue);
    }

    const LEADERBOARD_ROWS: usize = 10;

    /// Game instance holding all state
    struct Game {
        session: Session<BrowserClock>,
        audio: AudioManager,
        input: TickInput,
        store: Option<LocalStorageStore>,
        profile: Profile,
        high_scores: HighScores,
        settings: Settings,
        /// Run end already recorded (scores saved, overlay shown)
        recorded: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store = match LocalStorageStore::open() {
                Ok(store) => Some(store),
                Err(e) => {
                    log::warn!("Persistence disabled: {e}");
                    None
                }
            };
            let settings = store.as_ref().map(|s| Settings::load(s)).unwrap_or_default();
            let profile = store.as_ref().map(|s| Profile::load(s)).unwrap_or_default();
            let high_scores = store
                .as_ref()
                .map(|s| HighScores::load(s))
                .unwrap_or_default();

            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            audio.set_music_volume(settings.music_volume);
            audio.set_music_enabled(settings.music_enabled);

            let session = Session::new(BrowserClock::new(), settings.clone(), profile.theme(), seed);
            Self {
                session,
                audio,
                input: TickInput::default(),
                store,
                profile,
                high_scores,
                settings,
                recorded: false,
            }
        }

        fn frame(&mut self) {
            let input = self.input;
            // One-shot inputs
            self.input.fire = false;
            self.input.exit = false;

            let snapshot = self.session.frame(&input);
            if !self.recorded {
                self.audio.handle_events(snapshot.events, snapshot.hud.combo);
            }
            self.audio.update_music();

            match serde_json::to_string(&snapshot) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Snapshot encode failed: {e}"),
            }
            let hud = snapshot.hud.clone();
            write_hud(&hud);

            if !hud.running && !self.recorded {
                self.record_run_end();
            }
        }

        fn record_run_end(&mut self) {
            self.recorded = true;
            self.audio.stop_music();
            let summary = self.session.summary();
            let rank = self
                .high_scores
                .add_score(summary.score, summary.boss_level, js_sys::Date::now());
            if let Some(rank) = rank {
                log::info!("New local high score #{rank}");
            }
            if let Some(store) = &mut self.store {
                if let Err(e) = self.high_scores.save(store) {
                    log::warn!("Could not save high scores: {e}");
                }
            }
            show_game_over(summary.score);
            refresh_leaderboard();
        }

        fn restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.session.set_settings(self.settings.clone());
            self.session.set_theme(self.profile.theme());
            self.session.restart(seed);
            self.input = TickInput::default();
            self.recorded = false;
            self.audio.resume();
            self.audio.start_music(MusicTrack::Normal);
            set_hidden("game-over", true);
        }

        fn submit_score(&self, callsign: &str) {
            let score = self.session.summary().score;
            match ScoreSubmission::new(callsign, score).and_then(|s| s.to_json()) {
                Ok(json) => upload_score(&json),
                Err(e) => set_text("submit-status", &e.to_string()),
            }
        }

        fn select_theme(&mut self, id: &str) {
            match self.profile.buy_or_equip(id) {
                Ok(theme) => {
                    self.session.set_theme(theme);
                    set_text("shop-status", theme.name);
                    if let Some(store) = &mut self.store {
                        if let Err(e) = self.profile.save(store) {
                            log::warn!("Could not save profile: {e}");
                        }
                    }
                }
                Err(e) => set_text("shop-status", &e.to_string()),
            }
            set_text("credits", &self.profile.credits.to_string());
        }

        fn set_key(&mut self, key: &str, down: bool) {
            match key {
                "ArrowLeft" | "a" | "A" => self.input.left = down,
                "ArrowRight" | "d" | "D" => self.input.right = down,
                "ArrowUp" | "w" | "W" => self.input.up = down,
                "ArrowDown" | "s" | "S" => self.input.down = down,
                _ => {}
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_bar(id: &str, fraction: f32, color: Option<u32>) {
        let Some(el) = document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let style = el.style();
        let _ = style.set_property("width", &format!("{:.1}%", fraction * 100.0));
        if let Some(color) = color {
            let _ = style.set_property("background-color", &format!("#{color:06x}"));
        }
    }

    /// Status widgets read from the snapshot
    fn write_hud(hud: &Hud) {
        set_text("hud-score", &hud.score.to_string());
        set_text("hud-combo", &hud.combo.to_string());
        set_text("hud-rank", hud.rank.label);
        set_bar("combo-timer", hud.combo_timer, Some(hud.rank.color));
        set_bar("power-timer", hud.power_timer, None);

        match &hud.boss {
            Some(boss) => {
                set_hidden("boss-bar", false);
                set_text("boss-name", boss.name);
                set_bar("boss-hp", boss.hp_fraction, Some(boss.color));
            }
            None => set_hidden("boss-bar", true),
        }
    }

    /// Ask the page for the remote table; rows land in `#leaderboard`
    fn refresh_leaderboard() {
        let done = Closure::once_into_js(move |json: String| show_leaderboard(&json));
        request_leaderboard(done);
    }

    fn show_leaderboard(json: &str) {
        match parse_rows(json) {
            Ok(rows) => set_text("leaderboard", &format_rows(&rows, LEADERBOARD_ROWS).join("\n")),
            Err(e) => log::warn!("Leaderboard unavailable: {e}"),
        }
    }

    fn show_game_over(score: u64) {
        set_text("final-score", &score.to_string());
        set_hidden("game-over", false);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Storm starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.borrow();
            set_text("credits", &g.profile.credits.to_string());
        }

        setup_keyboard(game.clone());
        setup_buttons(game.clone());
        setup_focus(game.clone());
        refresh_leaderboard();

        game.borrow_mut().audio.start_music(MusicTrack::Normal);
        request_animation_frame(game);

        log::info!("Neon Storm running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.input.fire = true;
                        }
                    }
                    "Escape" => g.input.exit = true,
                    key => g.set_key(key, true),
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().set_key(event.key().as_str(), false);
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click("restart-btn", move |_| game.borrow_mut().restart());
        }

        {
            let game = game.clone();
            on_click("submit-btn", move |_| {
                let callsign = document()
                    .and_then(|d| d.get_element_by_id("callsign"))
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                game.borrow().submit_score(&callsign);
            });
        }

        for theme in CATALOG {
            let game = game.clone();
            on_click(&format!("theme-{}", theme.id), move |_| {
                game.borrow_mut().select_theme(theme.id)
            });
        }
    }

    fn setup_focus(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input = TickInput::default();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                    log::info!("Muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.audio.is_muted() {
                    g.audio.set_muted(false);
                    g.audio.resume();
                }
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(document) = document() {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let g = game.borrow();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.audio.suspend();
                } else {
                    g.audio.resume();
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().frame();
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_storm::leaderboard::{HighScores, ScoreSubmission};
    use neon_storm::persistence::MemoryStore;
    use neon_storm::platform::SteppedClock;
    use neon_storm::{Session, Settings, Theme};

    env_logger::init();
    log::info!("Neon Storm (native) starting...");
    log::info!("Headless autopilot run - use the web build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    let mut session = Session::new(SteppedClock::default(), Settings::default(), Theme::default(), seed);
    let mut frame = 0;
    while session.is_running() && frame < MAX_FRAMES {
        let input = autopilot::steer(session.state(), frame);
        session.frame(&input);
        frame += 1;
    }
    if session.is_running() {
        session.exit();
    }

    let summary = session.summary();
    log::info!(
        "Run over: score {} boss level {} after {} frames ({:?})",
        summary.score,
        summary.boss_level,
        summary.frames,
        summary.reason
    );

    let mut store = MemoryStore::new();
    let mut scores = HighScores::new();
    scores.add_score(summary.score, summary.boss_level, 0.0);
    if let Err(e) = scores.save(&mut store) {
        log::warn!("Could not save high scores: {e}");
    }

    match ScoreSubmission::new("AUTOPILOT", summary.score).and_then(|s| s.to_json()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("No submission: {e}"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use neon_storm::sim::{GameState, TickInput};

    const DEAD_ZONE: f32 = 6.0;
    const DODGE_RANGE: f32 = 90.0;

    /// Dodge hostile fire and close enemies, otherwise line up under a target
    pub fn steer(state: &GameState, frame: u64) -> TickInput {
        let me = state.player.center();

        let threat = state
            .bullets
            .iter()
            .filter(|b| b.active && !b.is_player())
            .map(|b| b.pos)
            .chain(
                state
                    .enemies
                    .iter()
                    .filter(|e| e.is_alive() && state.power_level == 0)
                    .map(|e| e.center()),
            )
            .filter(|p| p.y < me.y + 30.0 && p.distance(me) < DODGE_RANGE)
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));

        let target_x = if let Some(t) = threat {
            if t.x < me.x { me.x + DODGE_RANGE } else { me.x - DODGE_RANGE }
        } else if let Some(drop) = state.drops.iter().find(|d| !d.consumed && d.pos.y > 200.0) {
            drop.pos.x + 25.0
        } else if let Some(boss) = &state.boss {
            boss.center().x
        } else {
            state
                .enemies
                .iter()
                .filter(|e| e.is_alive())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.center().x)
                .unwrap_or(me.x)
        };

        TickInput {
            left: target_x < me.x - DEAD_ZONE,
            right: target_x > me.x + DEAD_ZONE,
            up: me.y > 520.0,
            fire: frame % 6 == 0,
            ..Default::default()
        }
    }
}
