use std::{
    ffi::{OsStr, OsString},
    fmt,
};

/// A program and its argument vector, passed to the OS without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Executable to spawn.
    program: OsString,
    /// Arguments, in order.
    args:    Vec<OsString>,
}

impl CommandLine {
    /// Creates a command line with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args:    Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns a copy of this command line with `arg` appended as the last
    /// argument. The template itself is left untouched so it can be reused
    /// for every test case.
    pub fn with_trailing(&self, arg: impl Into<OsString>) -> Self {
        self.clone().arg(arg)
    }

    /// The executable to spawn.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// The argument vector.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

/// Renders the command line for logs; arguments containing spaces are quoted.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |part: &OsStr| {
            let text = part.to_string_lossy();
            if text.contains(' ') {
                format!("\"{text}\"")
            } else {
                text.into_owned()
            }
        };

        write!(f, "{}", render(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", render(arg))?;
        }
        Ok(())
    }
}
