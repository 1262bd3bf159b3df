mod components;
mod config;
mod engine;
mod error;
mod model;
mod render;
mod state;
mod util;

use components::app::App;

fn main() {
    if let Err(err) = util::init_logging(log::LevelFilter::Info) {
        web_sys::console::warn_1(&format!("logger already installed: {err}").into());
    }
    log::info!("life wave starting");
    yew::Renderer::<App>::new().render();
}
