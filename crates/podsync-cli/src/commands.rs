//! Command execution
//!
//! Output goes to the supplied writer; logging stays on stderr.

use std::io::Write;

use podsync_core::{
    FrameFactory, MessageFactory, PodsyncError, StatusEvent, CURRENT_PRESET, CURRENT_SET,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::app::PodsyncApp;
use crate::cli::Commands;
use crate::error::Result;

pub struct CommandDispatcher;

impl CommandDispatcher {
    pub async fn execute<W: Write>(app: &PodsyncApp, command: &Commands, out: &mut W) -> Result<()> {
        match command {
            Commands::Scan => Self::scan(app, out).await,
            Commands::Config => {
                writeln!(out, "{}", app.config().to_toml()?)?;
                Ok(())
            }
            Commands::Select { set, preset } => {
                app.attach().await?;
                app.controller().select_preset(*preset, *set).await?;
                let board = app.controller().board().lock().await;
                writeln!(
                    out,
                    "Selected set {} preset {}: {}",
                    set,
                    preset,
                    board.current_preset_name().unwrap_or_default()
                )?;
                Ok(())
            }
            Commands::Param {
                slot,
                pid,
                value,
                bound,
            } => {
                let controller = app.controller();
                match bound {
                    Some(bound) => {
                        controller
                            .set_parameter_bound((*bound).into(), *slot, *pid, value)
                            .await?
                    }
                    None => {
                        controller
                            .set_pedal_board_item_parameter_value(*slot, *pid, value)
                            .await?
                    }
                }
                controller.settle().await;

                let board = controller.board().lock().await;
                match board.parameter(*slot, *pid) {
                    Some(param) => writeln!(out, "slot {}: {}", slot, param)?,
                    None => writeln!(out, "No parameter {} on slot {}", pid, slot)?,
                }
                Ok(())
            }
            Commands::Rename { name } => {
                app.attach().await?;
                app.controller().set_current_preset_name(name).await?;
                writeln!(out, "Renamed current preset to {:?}", name)?;
                Ok(())
            }
            Commands::Save => {
                app.attach().await?;
                app.controller().save_preset().await?;
                match app.pod().device_state().saved.last() {
                    Some((set, preset)) => writeln!(out, "Saved to set {} preset {}", set, preset)?,
                    None => writeln!(out, "Nothing selected, nothing saved")?,
                }
                Ok(())
            }
            Commands::Status { frame } => {
                app.attach().await?;
                app.controller().query_current_preset().await?;
                app.controller().settle().await;

                let snapshot = app.controller().board().snapshot().await;
                serde_json::to_writer_pretty(&mut *out, &snapshot)?;
                writeln!(out)?;
                if *frame {
                    let message =
                        FrameFactory::new().preset_definition(&snapshot, CURRENT_PRESET, CURRENT_SET)?;
                    writeln!(out, "{}", hex::encode(message.frame()))?;
                }
                Ok(())
            }
        }
    }

    async fn scan<W: Write>(app: &PodsyncApp, out: &mut W) -> Result<()> {
        let controller = app.controller();
        let mut events = controller.subscribe();
        let mut scan = controller.detach(|c| async move { c.init_device().await });

        let joined = loop {
            tokio::select! {
                joined = &mut scan => break joined,
                event = events.recv() => match event {
                    Ok(event) => print_event(out, &event)?,
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Progress output fell behind"),
                    Err(RecvError::Closed) => break (&mut scan).await,
                },
            }
        };
        while let Ok(event) = events.try_recv() {
            print_event(out, &event)?;
        }

        joined.map_err(|e| PodsyncError::Task {
            message: e.to_string(),
        })??;

        let board = controller.board().lock().await;
        if let Some((set, preset)) = board.selection() {
            info!(set, preset, "Scan finished");
            writeln!(
                out,
                "Current: set {} preset {} ({})",
                set,
                preset,
                board.current_preset_name().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

fn print_event<W: Write>(out: &mut W, event: &StatusEvent) -> std::io::Result<()> {
    match event {
        StatusEvent::Progress { percent } => writeln!(out, "Progress: {:>3}%", percent),
        StatusEvent::InitDone => writeln!(out, "Init done"),
        _ => Ok(()),
    }
}
