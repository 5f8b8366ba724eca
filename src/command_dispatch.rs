//! Purpose: Hold top-level CLI command dispatch for `camparams`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every command builds one `ParameterStore` per invocation and drops it on return.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    let span = tracing::info_span!("camparams");
    match command {
        Command::Parse { input } => {
            let store = ParameterStore::with_span(&read_params(&input)?, span);
            emit_json(store_json(&store)?);
            Ok(RunOutcome::ok())
        }
        Command::Serialize { input } => {
            let store = ParameterStore::with_span(&read_params(&input)?, span);
            println!("{store}");
            Ok(RunOutcome::ok())
        }
        Command::Caps {
            input,
            kind,
            format,
        } => {
            let store = ParameterStore::with_span(&read_params(&input)?, span);
            let caps = match kind {
                CapsKind::Viewfinder => store.get_viewfinder_caps(),
                CapsKind::Video => store.get_video_caps(),
                CapsKind::Image => store.get_image_caps(),
            };
            match format {
                CapsFormat::Json => {
                    let value = serde_json::to_value(&caps).map_err(|err| {
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to encode caps")
                            .with_source(err)
                    })?;
                    emit_json(json!({ "caps": value }));
                }
                CapsFormat::Caps => {
                    for record in &caps {
                        println!("{}", record.to_caps_string());
                    }
                }
            }
            Ok(RunOutcome::ok())
        }
    }
}
