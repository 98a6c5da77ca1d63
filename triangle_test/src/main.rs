//! Opens a window, brings up Vulkan and waits for the window to be closed.
//!
//! Usage: `triangle_test [config.toml | config.ron]`

use hello_vulkan::foundation::logging;
use hello_vulkan::prelude::*;

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(path),
        None => Ok(ApplicationConfig::default()),
    }
}

fn run(config: ApplicationConfig) -> Result<(), AppError> {
    let window_system = GlfwWindowSystem::init()?;
    let driver = AshDriver::load()?;
    Application::new(config, window_system, driver).run()
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.log_level);

    if let Err(e) = run(config) {
        log::error!("Application error: {}", e);
        std::process::exit(1);
    }
}
