use std::path::PathBuf;

use anyhow::Result;
use log::info;

use lapsecam::{
    assemble_video, AssemblySettings, CaptureController, ConfigStore, TestPatternSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut assemble = false;
    let mut config_path = PathBuf::from("lapsecam.json");
    for arg in std::env::args().skip(1) {
        if arg == "assemble" {
            assemble = true;
        } else {
            config_path = PathBuf::from(arg);
        }
    }

    let store = ConfigStore::new(config_path)?;
    let config = store.current();

    if assemble {
        let output = assemble_video(&config, &AssemblySettings::default())?;
        info!("Wrote {}", output.display());
        return Ok(());
    }

    // The real camera driver is an external collaborator; the synthetic
    // pattern source exercises the whole pipeline without hardware.
    let source = TestPatternSource::new(1280, 720);

    let controller = CaptureController::new(config);
    let mut snapshots = controller.subscribe();
    controller.start(source).await?;
    info!("Capture running; press ctrl-c to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                if snap.countdown_text.is_empty() {
                    println!("{}", snap.status_text);
                } else {
                    println!("{} (next photo in {})", snap.status_text, snap.countdown_text);
                }
            }
        }
    }

    controller.stop().await?;
    Ok(())
}
