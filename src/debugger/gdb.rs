//! GDB/MI driver.
//!
//! Commands are written with a numeric token (`7-thread-info`) and the
//! matching `7^...` result record is awaited. Asynchronous records seen
//! along the way are used to track whether the target is running.

use super::mi::{find, parse_record, AsyncKind, MiRecord, MiValue, ResultClass, StreamKind};
use super::{Debugger, ThreadInfo};
use crate::utils::error::DebuggerError;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

type Results = Vec<(String, MiValue)>;

/// MI session over any line-oriented transport
///
/// **Public** - wrapped by [`GdbProcess`]; usable directly over scripted
/// transcripts
pub struct GdbMi<R, W> {
    reader: R,
    writer: W,
    next_token: u64,
    /// Reason of the last `*stopped` record, `None` while running
    stop_reason: Option<String>,
}

impl<R: BufRead, W: Write> GdbMi<R, W> {
    /// Create a session; the target is assumed to be stopped
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_token: 1,
            stop_reason: Some(String::new()),
        }
    }

    /// Run one MI command and return its results
    ///
    /// # Errors
    /// * `DebuggerError::CommandFailed` - gdb answered `^error`
    /// * `DebuggerError::DebuggerExited` - gdb answered `^exit` or closed its output
    pub fn execute(&mut self, command: &str) -> Result<Results, DebuggerError> {
        let token = self.next_token;
        self.next_token += 1;

        debug!("gdb <- {}{}", token, command);
        writeln!(self.writer, "{}{}", token, command)?;
        self.writer.flush()?;

        loop {
            if let MiRecord::Result {
                token: Some(received),
                class,
                results,
            } = self.next_record()?
            {
                if received != token {
                    continue;
                }
                return match class {
                    ResultClass::Error => Err(DebuggerError::CommandFailed {
                        command: command.to_string(),
                        message: find(&results, "msg")
                            .and_then(MiValue::as_str)
                            .unwrap_or("unknown error")
                            .to_string(),
                    }),
                    ResultClass::Exit => Err(DebuggerError::DebuggerExited),
                    _ => Ok(results),
                };
            }
        }
    }

    /// Block until the target reports `*stopped` and return the stop reason
    pub fn wait_for_stop(&mut self) -> Result<String, DebuggerError> {
        loop {
            if let Some(reason) = &self.stop_reason {
                return Ok(reason.clone());
            }
            self.next_record()?;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_reason.is_some()
    }

    fn next_record(&mut self) -> Result<MiRecord, DebuggerError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(DebuggerError::DebuggerExited);
            }
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record(&line)?;
            self.observe(&record);
            return Ok(record);
        }
    }

    fn observe(&mut self, record: &MiRecord) {
        match record {
            MiRecord::Async {
                kind: AsyncKind::Exec,
                class,
                results,
                ..
            } => match class.as_str() {
                "running" => self.stop_reason = None,
                "stopped" => {
                    let reason = find(results, "reason")
                        .and_then(MiValue::as_str)
                        .unwrap_or_default();
                    debug!("gdb -> target stopped ({})", reason);
                    self.stop_reason = Some(reason.to_string());
                }
                _ => {}
            },
            MiRecord::Stream {
                kind: StreamKind::Log,
                text,
            } => debug!("gdb: {}", text.trim_end()),
            _ => {}
        }
    }
}

impl<R: BufRead, W: Write> Debugger for GdbMi<R, W> {
    fn resume(&mut self) -> Result<(), DebuggerError> {
        self.stop_reason = None;
        self.execute("-exec-continue")?;
        Ok(())
    }

    fn interrupt(&mut self) -> Result<(), DebuggerError> {
        if !self.is_stopped() {
            match self.execute("-exec-interrupt") {
                Ok(_) => {}
                // The target stopped on its own before the interrupt arrived.
                Err(DebuggerError::CommandFailed { .. }) if self.is_stopped() => {}
                Err(e) => return Err(e),
            }
        }

        let reason = self.wait_for_stop()?;
        if reason.starts_with("exited") {
            return Err(DebuggerError::TargetExited(reason));
        }
        Ok(())
    }

    fn threads(&mut self) -> Result<Vec<ThreadInfo>, DebuggerError> {
        let results = self.execute("-thread-info")?;
        let threads = find(&results, "threads")
            .and_then(MiValue::as_list)
            .ok_or_else(|| {
                DebuggerError::UnexpectedResponse("-thread-info without threads".to_string())
            })?;

        let mut infos = Vec::with_capacity(threads.len());
        for thread in threads {
            let id = thread
                .get("id")
                .and_then(MiValue::as_str)
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| {
                    DebuggerError::UnexpectedResponse(format!(
                        "thread without numeric id: {:?}",
                        thread
                    ))
                })?;
            let name = thread
                .get("name")
                .and_then(MiValue::as_str)
                .map(str::to_string);
            infos.push(ThreadInfo { id, name });
        }

        Ok(infos)
    }

    fn call_chain(&mut self, thread_id: u64) -> Result<Vec<Option<String>>, DebuggerError> {
        let results = self.execute(&format!("-stack-list-frames --thread {}", thread_id))?;
        let frames = find(&results, "stack")
            .and_then(MiValue::as_list)
            .ok_or_else(|| {
                DebuggerError::UnexpectedResponse("-stack-list-frames without stack".to_string())
            })?;

        // MI lists the innermost frame first.
        Ok(frames
            .iter()
            .rev()
            .map(|frame| frame.get("func").and_then(MiValue::as_str).map(str::to_string))
            .collect())
    }

    fn detach(&mut self) -> Result<(), DebuggerError> {
        self.execute("-target-detach")?;
        Ok(())
    }
}

/// A gdb child process attached to a target
///
/// **Public** - the debugger used by `gdbprof profile`
pub struct GdbProcess {
    child: Child,
    mi: GdbMi<BufReader<ChildStdout>, ChildStdin>,
}

impl GdbProcess {
    /// Start gdb and attach it to `pid`
    ///
    /// **Public** - main entry point for live profiling
    ///
    /// # Arguments
    /// * `gdb` - Path or name of the gdb executable
    /// * `pid` - Process to attach to
    ///
    /// # Returns
    /// A session with the target stopped
    pub fn attach(gdb: &Path, pid: u32) -> Result<Self, DebuggerError> {
        let mut command = Command::new(gdb);
        command
            .args(["--interpreter=mi2", "--nx", "--quiet"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        // Keep terminal signals aimed at us away from gdb.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(DebuggerError::SpawnFailed)?;
        debug!("Started {} (pid {})", gdb.display(), child.id());

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(DebuggerError::UnexpectedResponse(
                    "debugger pipes unavailable".to_string(),
                ));
            }
        };

        let mut process = Self {
            child,
            mi: GdbMi::new(BufReader::new(stdout), stdin),
        };

        if let Err(e) = process.mi.execute("-gdb-set mi-async on") {
            warn!("mi-async not supported ({}), falling back to target-async", e);
            process.mi.execute("-gdb-set target-async on")?;
        }

        process.mi.stop_reason = None;
        process.mi.execute(&format!("-target-attach {}", pid))?;
        process.mi.wait_for_stop()?;

        info!("Attached to process {}", pid);
        Ok(process)
    }

    /// Quit gdb and reap it
    pub fn finish(mut self) -> Result<(), DebuggerError> {
        match self.mi.execute("-gdb-exit") {
            Ok(_) | Err(DebuggerError::DebuggerExited) => {}
            Err(e) => return Err(e),
        }
        let status = self.child.wait()?;
        debug!("gdb exited with {}", status);
        Ok(())
    }
}

impl Debugger for GdbProcess {
    fn resume(&mut self) -> Result<(), DebuggerError> {
        self.mi.resume()
    }

    fn interrupt(&mut self) -> Result<(), DebuggerError> {
        self.mi.interrupt()
    }

    fn threads(&mut self) -> Result<Vec<ThreadInfo>, DebuggerError> {
        self.mi.threads()
    }

    fn call_chain(&mut self, thread_id: u64) -> Result<Vec<Option<String>>, DebuggerError> {
        self.mi.call_chain(thread_id)
    }

    fn detach(&mut self) -> Result<(), DebuggerError> {
        self.mi.detach()
    }
}

impl Drop for GdbProcess {
    fn drop(&mut self) {
        // No-op when `finish` already reaped the child.
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
