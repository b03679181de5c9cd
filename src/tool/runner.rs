//! External process execution
//!
//! Everything that talks to the build tool goes through [`ProcessRunner`], so
//! tests can swap in a scripted runner instead of spawning `nix`.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.current_dir = dir;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Describes how the process ended, for error messages
    pub fn exit_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external commands to completion
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        (**self).run(invocation)
    }
}

/// Spawns real processes, reading their output line by line as it arrives
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Mirror every output line to our stderr while the process runs
    echo: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let echo = self.echo;

        // stdout drains on a scoped thread while stderr streams here
        let (stdout, stderr) = thread::scope(|scope| -> io::Result<(String, String)> {
            let stdout_reader = scope.spawn(move || match stdout_pipe {
                Some(pipe) => drain_lines(pipe, echo),
                None => Ok(String::new()),
            });
            let stderr = match stderr_pipe {
                Some(pipe) => drain_lines(pipe, echo)?,
                None => String::new(),
            };
            let stdout = stdout_reader
                .join()
                .map_err(|_| io::Error::other("stdout reader panicked"))??;
            Ok((stdout, stderr))
        })?;

        let status = child.wait()?;

        Ok(ProcessOutput {
            code: status.code(),
            success: status.success(),
            stdout,
            stderr,
        })
    }
}

/// Reads a stream to EOF one line at a time, tolerating invalid UTF-8
fn drain_lines(pipe: impl Read, echo: bool) -> io::Result<String> {
    let mut reader = BufReader::new(pipe);
    let mut collected = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if echo {
            eprintln!("{}", line.trim_end_matches(['\n', '\r']));
        }
        collected.push_str(&line);
    }

    Ok(collected)
}
