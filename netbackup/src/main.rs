// File: netbackup/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use netbackup::capture::CaptureMode;
use netbackup::constants::paths;
use netbackup::{
    BackupJob, CaptureDriver, ConfigManager, RetentionJob, RetentionSweeper, Scheduler,
    SshConnector,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("netbackup=info".parse()?)
        .add_directive("russh=warn".parse()?)
        .add_directive("async_ssh2_tokio=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting network configuration backup");

    let config_manager = ConfigManager::new(paths::CONFIG_DIR).await?;
    let config = config_manager.get_current_config();

    if config.capture.mode == CaptureMode::SideChannel {
        warn!(
            "Side-channel mode: devices push to {} over TFTP; arrival of backup files is not verified",
            config.capture.transfer_target
        );
    }

    let connector = Arc::new(SshConnector::new(config.connect_timeout()));
    let driver = CaptureDriver::from_config(&config, connector)?;
    let sweeper = RetentionSweeper::new(config.backup_dir.clone(), config.retention_threshold());

    let mut scheduler =
        Scheduler::new(config.poll_interval()).run_on_start(config.schedule.run_on_start);
    scheduler.every(
        "backup",
        config.backup_interval(),
        BackupJob::new(driver, config.inventory_path.clone()),
    );
    scheduler.every(
        "retention",
        config.retention_interval(),
        RetentionJob::new(sweeper),
    );

    // In-flight captures and sweeps are not drained on shutdown
    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = shutdown_signal() => info!("Shutdown signal received, exiting"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
