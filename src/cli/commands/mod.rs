//! Command execution.
//!
//! Each subcommand gets its own module. Failures are reported through the
//! output manager together with recovery suggestions, and map to a non-zero
//! exit code instead of bubbling out of the process as a panic.

mod helpers;
mod init;
mod list;
mod rollback;
mod update;

use crate::cli::{Args, Command, OutputManager};
use crate::error::Result;

/// Execute the parsed command and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.quiet);
    let command_name = args.command.name();

    let result = match args.command {
        Command::Init => init::execute_init(&output).await,
        Command::Update {
            message,
            version,
            skip_export,
        } => update::execute_update(message, version, skip_export, &output).await,
        Command::List => list::execute_list(&output).await,
        Command::Rollback { update_id, yes } => {
            rollback::execute_rollback(&update_id, yes, &output).await
        }
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            output.error(&format!("Command '{command_name}' failed: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&suggestion);
                }
            }

            Ok(1)
        }
    }
}
