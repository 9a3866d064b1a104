//! WASM exports for the critter simulation.
//!
//! The host calls `sim_init` once with the config and level JSON, then
//! `sim_tick` from its frame callback, and reads agent records straight out
//! of linear memory through the pointer accessors.

pub mod runner;

pub use runner::SimRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SimRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner, or return `None` before `sim_init` succeeded.
fn with_runner<R>(f: impl FnOnce(&mut SimRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
}

#[wasm_bindgen]
pub fn sim_init(config_json: &str, level_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    // Browsers give the simulation no entropy source; the clock seeds unseeded configs.
    let default_seed = js_sys::Date::now() as u64;
    let runner = SimRunner::from_json(config_json, level_json, default_seed).map_err(|e| {
        log::error!("critter-sim: init failed: {}", e);
        JsValue::from_str(&e.to_string())
    })?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("critter-sim: initialized");
    Ok(())
}

/// Advance by one rendered frame. Returns the number of fixed ticks run.
#[wasm_bindgen]
pub fn sim_tick(dt: f32) -> u32 {
    with_runner(|r| r.tick(dt)).unwrap_or(0)
}

#[wasm_bindgen]
pub fn sim_kill(id: u32) -> bool {
    with_runner(|r| r.kill(id)).unwrap_or(false)
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_alive_count() -> u32 {
    with_runner(|r| r.alive_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_agents_ptr() -> *const f32 {
    with_runner(|r| r.agents_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_agent_count() -> u32 {
    with_runner(|r| r.agent_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_agents() -> u32 {
    with_runner(|r| r.max_agents()).unwrap_or(0)
}
