#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use emucleaner::adb::{AdbClient, CommandOutput, CommandRunner, Device, DeviceKind};
use emucleaner::common::CleanerError;

pub const ADB: &str = "/sdk/platform-tools/adb";

/// Runner that replays queued responses and records every invocation
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<Result<CommandOutput, CleanerError>>>,
    fallback: Mutex<Option<CommandOutput>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: Result<CommandOutput, CleanerError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn ok(&self, stdout: &str) -> &Self {
        self.push(Ok(CommandOutput::ok(stdout)))
    }

    pub fn fail(&self, stderr: &str) -> &Self {
        self.push(Ok(CommandOutput::failed(stderr)))
    }

    /// Response used once the queue is empty
    pub fn otherwise(&self, output: CommandOutput) -> &Self {
        *self.fallback.lock().unwrap() = Some(output);
        self
    }

    /// Each call as `[program, args...]`
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Each call as one space-joined line
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.join(" ")).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, CleanerError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }
        Ok(self
            .fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| CommandOutput::failed("no scripted response")))
    }
}

pub fn client(runner: &Arc<ScriptedRunner>) -> AdbClient {
    AdbClient::new(runner.clone(), ADB).with_root_settle(Duration::from_millis(1))
}

pub fn emulator() -> Device {
    device("emulator-5554")
}

pub fn physical() -> Device {
    device("R58M123ABC")
}

pub fn device(serial: &str) -> Device {
    Device {
        id: serial.to_string(),
        status: "device".to_string(),
        kind: DeviceKind::from_serial(serial),
        model: "sdk_gphone64_arm64".to_string(),
        os_version: "14".to_string(),
        sdk_version: "34".to_string(),
    }
}
