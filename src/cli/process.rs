//! External process helpers for the infrastructure and server commands

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command as TokioCommand;

use crate::common::{paths, Error, Result};

/// `docker compose -f <compose file> <args..>`
pub fn compose_command(args: &[&str]) -> Vec<String> {
    let mut cmd = vec![
        "docker".to_string(),
        "compose".to_string(),
        "-f".to_string(),
        paths::compose_dev_file().display().to_string(),
    ];
    cmd.extend(args.iter().map(|a| a.to_string()));
    cmd
}

/// Run a command to completion, then print its captured output
///
/// A non-zero exit is reported but not treated as an error, the command's
/// own output already explains what went wrong.
pub async fn run_cmd(cmd: &[String]) -> Result<()> {
    let (program, args) = cmd
        .split_first()
        .ok_or_else(|| Error::Internal("empty command".to_string()))?;

    println!("RUN: {}", cmd.join(" "));

    let output = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::command_failed(&cmd.join(" "), &e.to_string()))?;

    println!("{}", String::from_utf8_lossy(&output.stdout));
    println!("{}", String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        tracing::warn!(status = ?output.status.code(), command = %cmd.join(" "), "Command exited unsuccessfully");
    }

    Ok(())
}

/// Replace the current process with `program args..`
///
/// Only returns on failure. Where process replacement is unavailable the
/// program is run to completion and this process exits with its code.
pub fn exec(program: &Path, args: &[&str]) -> Result<()> {
    let command_line = format!("{} {}", program.display(), args.join(" "));
    tracing::debug!(command = %command_line, "Handing over control");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let err = std::process::Command::new(program).args(args).exec();
        return Err(Error::command_failed(&command_line, &err.to_string()));
    }

    #[cfg(not(unix))]
    {
        let status = std::process::Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Error::command_failed(&command_line, &e.to_string()))?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

/// Start the application server in place of this process
pub fn exec_server() -> Result<()> {
    exec(&paths::mvnw(), &["spring-boot:run"])
}
