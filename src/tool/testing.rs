//! Scripted process runner for unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use super::runner::{Invocation, ProcessOutput, ProcessRunner};

/// Replays canned outputs in order and records every invocation
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: RefCell<VecDeque<io::Result<ProcessOutput>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, output: ProcessOutput) -> Self {
        self.outputs.borrow_mut().push_back(Ok(output));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        self.outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::NotFound, "no such program")))
    }
}

pub fn ok(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(0),
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(stderr: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(1),
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
