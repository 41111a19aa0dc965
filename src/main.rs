use std::env;

use anyhow::bail;
use app::App;
use config::Config;

mod app;
mod cmd;
mod config;
mod cursor;
mod dial;
mod engine;
mod input;
mod math;
mod wipe;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let config = match &*env::args_os().skip(1).collect::<Vec<_>>() {
        [] => Config::default(),
        [path] => Config::load(path)?,
        _ => {
            bail!("usage: {} [config.toml]", env!("CARGO_PKG_NAME"));
        }
    };

    let event_loop = winit::event_loop::EventLoop::new()?;
    let mut app = App::new(config)?;
    Ok(event_loop.run_app(&mut app)?)
}
