//! Running external tools and turning their exit status into errors.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};

use itertools::Itertools;
use log::{error, info};

use crate::Error;

/// A single invocation of an external program.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        ExternalCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a `--name value` pair.
    pub fn opt<S: Into<OsString>>(self, name: &str, value: S) -> Self {
        self.arg(name).arg(value)
    }

    /// Append a `--name <path>` pair.
    pub fn path_opt(self, name: &str, value: &Path) -> Self {
        self.opt(name, value.as_os_str())
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Run the command to completion. A non-zero exit is reported as
    /// [`Error::CommandFailed`] carrying `description`.
    pub fn run(&self, description: &str) -> Result<(), Error> {
        info!("{}", self);
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| Error::Launch {
                description: description.to_string(),
                command: self.to_string(),
                source,
            })?;

        match exit_code(status) {
            0 => Ok(()),
            code => {
                error!("{} with code {}. Exiting.", description, code);
                Err(Error::CommandFailed {
                    description: description.to_string(),
                    code,
                })
            }
        }
    }
}

fn quote(s: &std::ffi::OsStr) -> String {
    let s = s.to_string_lossy();
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.into_owned()
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let line = std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| quote(s))
            .join(" ");
        write!(f, "{}", line)
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
