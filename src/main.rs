//! Tile Merge entry point
//!
//! Browser builds drive the engine from DOM events; native builds run a
//! terminal version reading moves from stdin.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, TouchEvent};

    use tile_merge::input::SwipeTracker;
    use tile_merge::{Direction, Game, GameRecord, MoveOutcome};

    /// DOM elements the game updates
    struct Dom {
        document: Document,
        score: Option<Element>,
        best_score: Option<Element>,
        tiles: Option<Element>,
        message: Option<Element>,
    }

    impl Dom {
        fn new(document: Document) -> Self {
            Self {
                score: document.get_element_by_id("score"),
                best_score: document.get_element_by_id("best-score"),
                tiles: document.get_element_by_id("tiles-container"),
                message: document.get_element_by_id("game-message"),
                document,
            }
        }
    }

    /// Browser-side session: engine, stored record and gesture state
    struct App {
        game: Game,
        record: GameRecord,
        swipe: SwipeTracker,
        dom: Dom,
    }

    impl App {
        fn new(seed: u64, dom: Dom) -> Self {
            Self {
                game: Game::with_seed(seed),
                record: GameRecord::load(),
                swipe: SwipeTracker::default(),
                dom,
            }
        }

        fn restart(&mut self) {
            self.finish_session();
            self.game.new_game();
            self.hide_message();
            self.draw(None);
            log::info!("Game restarted");
        }

        fn keep_playing(&mut self) {
            self.game.acknowledge_win();
            self.hide_message();
        }

        fn play(&mut self, dir: Direction) {
            let outcome = self.game.make_move(dir);
            if !outcome.moved {
                return;
            }
            if self.record.update_best(self.game.score()) {
                self.record.save();
            }
            self.draw(Some(&outcome));

            if outcome.game_over {
                self.finish_session();
                self.show_message("Game Over!", false);
            } else if self.game.should_announce_win() {
                self.show_message("You Win!", true);
            }
        }

        /// Store last score and timestamp
        fn finish_session(&mut self) {
            if self.game.score() > 0 {
                self.record
                    .record_session(self.game.score(), js_sys::Date::now());
                self.record.save();
            }
        }

        /// Rebuild tile elements from the current grid snapshot
        fn draw(&self, outcome: Option<&MoveOutcome>) {
            if let Some(el) = &self.dom.score {
                el.set_text_content(Some(&self.game.score().to_string()));
            }
            if let Some(el) = &self.dom.best_score {
                el.set_text_content(Some(&self.record.best_score.to_string()));
            }

            let Some(container) = &self.dom.tiles else {
                return;
            };
            container.set_inner_html("");

            let spawned = outcome.and_then(|o| o.spawned);
            let cell_pct = 100.0 / self.game.size() as f64;
            for (row, values) in self.game.grid().rows().enumerate() {
                for (col, &value) in values.iter().enumerate() {
                    if value == tile_merge::engine::EMPTY {
                        continue;
                    }
                    let Ok(tile) = self.dom.document.create_element("div") else {
                        continue;
                    };
                    let is_new = spawned.is_some_and(|s| s.row == row && s.col == col);
                    let class = if is_new {
                        format!("tile tile-{} tile-new", value)
                    } else {
                        format!("tile tile-{}", value)
                    };
                    tile.set_class_name(&class);
                    tile.set_text_content(Some(&value.to_string()));
                    let _ = tile.set_attribute(
                        "style",
                        &format!(
                            "left: {}%; top: {}%",
                            col as f64 * cell_pct,
                            row as f64 * cell_pct
                        ),
                    );
                    let _ = container.append_child(&tile);
                }
            }
        }

        fn show_message(&self, text: &str, show_keep_playing: bool) {
            let Some(message) = &self.dom.message else {
                return;
            };
            if let Some(p) = message.query_selector("p").ok().flatten() {
                p.set_text_content(Some(text));
            }
            let _ = message.class_list().add_1("show");

            if let Some(btn) = self.dom.document.get_element_by_id("keep-playing") {
                let display = if show_keep_playing { "inline-block" } else { "none" };
                let _ = btn.set_attribute("style", &format!("display: {}", display));
            }
        }

        fn hide_message(&self) {
            if let Some(message) = &self.dom.message {
                let _ = message.class_list().remove_1("show");
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Tile Merge starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, cannot start");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, Dom::new(document.clone()))));
        app.borrow().draw(None);
        log::info!("Game initialized with seed: {}", seed);

        setup_buttons(&document, app.clone());
        setup_keyboard(&document, app.clone());
        setup_touch(&document, app);

        log::info!("Tile Merge running!");
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&mut app.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        on_click(document, "new-game", app.clone(), App::restart);
        on_click(document, "retry-btn", app.clone(), App::restart);
        on_click(document, "keep-playing", app, App::keep_playing);
    }

    fn setup_keyboard(document: &Document, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(dir) = Direction::from_key(&event.key()) {
                event.prevent_default();
                app.borrow_mut().play(dir);
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_touch(document: &Document, app: Rc<RefCell<App>>) {
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    app.borrow_mut()
                        .swipe
                        .begin(touch.client_x() as f32, touch.client_y() as f32);
                }
                event.prevent_default();
            });
            let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Touch end (swipe)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let mut app = app.borrow_mut();
                let swipe = app
                    .swipe
                    .end(touch.client_x() as f32, touch.client_y() as f32);
                if let Some(dir) = swipe {
                    app.play(dir);
                }
                event.prevent_default();
            });
            let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
                "touchend",
                closure.as_ref().unchecked_ref(),
                &options,
            );
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
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use tile_merge::{Direction, Game, GameConfig, GameRecord, Result};

    const HELP: &str = "Moves: w/a/s/d, h/j/k/l or up/down/left/right. \
                        n = new game, c = keep playing, q = quit";

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    /// Optional first argument: path to a JSON game config
    fn load_config() -> Result<GameConfig> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                let config = GameConfig::from_json(&json)?;
                log::info!("Loaded config from {}", path);
                Ok(config)
            }
            None => Ok(GameConfig::default()),
        }
    }

    fn parse_move(input: &str) -> Result<Direction> {
        match Direction::from_key(input) {
            Some(dir) => Ok(dir),
            None => input.parse(),
        }
    }

    fn print_board(game: &Game, record: &GameRecord) {
        println!();
        println!("Score: {}   Best: {}", game.score(), record.best_score);
        print!("{}", game.grid());
    }

    pub fn run() -> Result<()> {
        let config = load_config()?;
        let seed = now_ms() as u64;
        let mut game: Game = Game::new(config, Pcg32::seed_from_u64(seed))?;
        let mut record = GameRecord::load();
        log::info!("Game initialized with seed: {}", seed);

        println!("{}", HELP);
        print_board(&game, &record);

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let input = line.trim();

            match input {
                "" => continue,
                "q" | "quit" => break,
                "n" | "new" => {
                    record.record_session(game.score(), now_ms());
                    game.new_game();
                    print_board(&game, &record);
                    continue;
                }
                "c" | "continue" => {
                    game.acknowledge_win();
                    continue;
                }
                _ => {}
            }

            let dir = match parse_move(input) {
                Ok(dir) => dir,
                Err(e) => {
                    println!("{}. {}", e, HELP);
                    continue;
                }
            };

            let outcome = game.make_move(dir);
            if !outcome.moved {
                if game.is_game_over() {
                    println!("Game over. Press n for a new game.");
                }
                continue;
            }
            if record.update_best(game.score()) {
                record.save();
            }
            print_board(&game, &record);

            if outcome.game_over {
                println!("Game Over! Final score: {}", game.score());
            } else if game.should_announce_win() {
                println!("You Win! Press c to keep playing.");
            }
        }

        record.record_session(game.score(), now_ms());
        record.save();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tile Merge (native) starting...");

    if let Err(e) = terminal::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
