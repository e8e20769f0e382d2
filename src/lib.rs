use wasm_bindgen::prelude::*;

pub mod control;
pub mod rendering;
pub mod sim;
pub mod util;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use control::{Action, Plantation};
pub use sim::{CellState, Forest, ForestParameters, SimulationFrame, SpreadRule};

#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(fern::Output::call(console_log::log))
        .apply();
}
