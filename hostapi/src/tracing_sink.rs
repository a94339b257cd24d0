//! Log sink that forwards guest output to `tracing`.

use crate::traits::LogSink;

/// Emits each guest log line as an `info` event under target `lunx::guest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn write(&mut self, text: &str) {
        tracing::info!(target: "lunx::guest", "{text}");
    }
}
