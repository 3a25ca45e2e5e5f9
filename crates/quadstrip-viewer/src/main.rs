use anyhow::Result;

use quadstrip_engine::device::GpuInit;
use quadstrip_engine::logging::{init_logging, LoggingConfig};
use quadstrip_engine::scene::{DialogNotifier, SceneConfig};
use quadstrip_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let runtime = RuntimeConfig::default();
    let notifier = DialogNotifier::new(runtime.title.clone());

    log::info!("opening `{}`", runtime.title);
    Runtime::run(
        runtime,
        GpuInit::default(),
        SceneConfig::default(),
        Box::new(notifier),
    )
}
