//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Scrawl");

    let config = scrawl_app::AppConfig::from_env();
    pollster::block_on(scrawl_app::App::run(config));
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
