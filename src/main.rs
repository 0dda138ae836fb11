pub mod config;
pub mod error;
pub mod importers;
pub mod loader;
pub mod models;
pub mod schema;
pub mod store;

use std::path::Path;

use anyhow::Context;
use log::{debug, info};

use crate::config::{LoaderConfig, CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    let config = LoaderConfig::load(Path::new(CONFIG_FILE))?;

    let mut clog = colog::default_builder();
    clog.filter(None, config.log_level.into());
    clog.init();

    debug!("using {:?}", config);
    let summary = crate::loader::run(&config).with_context(|| {
        format!(
            "failed to build {:?} from {:?}",
            config.database_path, config.source_directory
        )
    })?;
    info!("{}", summary);

    Ok(())
}
