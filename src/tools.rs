//! Invocation of optional external programs.

use std::{ffi::OsString, io::ErrorKind, process::Stdio};

use tokio::process::Command;

use crate::error::{Error, Result};

/// Run a configured command line with `extra` arguments appended.
///
/// A program that cannot be found yields [`Error::ExternalToolMissing`] so
/// callers can downgrade it to a warning.
pub async fn run_tool<I, A>(command: &str, extra: I, quiet: bool) -> Result<()>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
{
    let words = shell_words::split(command).map_err(|error| Error::CommandParse {
        command: command.to_string(),
        message: error.to_string(),
    })?;
    let Some((program, args)) = words.split_first() else {
        return Err(Error::CommandParse {
            command: command.to_string(),
            message: "empty command".to_string(),
        });
    };

    let mut process = Command::new(program);
    process
        .args(args)
        .args(extra.into_iter().map(Into::into))
        .stdin(Stdio::null());
    if quiet {
        process.stdout(Stdio::null()).stderr(Stdio::null());
    }

    match process.status().await {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(Error::ExternalToolFailed {
            program: program.clone(),
            message: format!("exited with {status}"),
        }),
        Err(error) if error.kind() == ErrorKind::NotFound => Err(Error::ExternalToolMissing {
            program: program.clone(),
        }),
        Err(error) => Err(Error::ExternalToolFailed {
            program: program.clone(),
            message: error.to_string(),
        }),
    }
}

/// Ask the system to rebuild its font cache. Failures are returned, not raised.
pub async fn refresh_font_cache(command: &str) -> Option<Error> {
    run_tool(command, Vec::<OsString>::new(), true).await.err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_reported_as_missing() {
        let error = run_tool("gfont-test-no-such-program --flag", ["x"], true)
            .await
            .expect_err("should fail");
        assert!(matches!(
            error,
            Error::ExternalToolMissing { program } if program == "gfont-test-no-such-program"
        ));
    }

    #[tokio::test]
    async fn empty_command_is_a_parse_error() {
        let error = run_tool("   ", Vec::<OsString>::new(), true)
            .await
            .expect_err("should fail");
        assert!(matches!(error, Error::CommandParse { .. }));
    }

    #[tokio::test]
    async fn unbalanced_quotes_are_a_parse_error() {
        let error = run_tool("fc-cache \"-v", Vec::<OsString>::new(), true)
            .await
            .expect_err("should fail");
        assert!(matches!(error, Error::CommandParse { .. }));
    }
}
