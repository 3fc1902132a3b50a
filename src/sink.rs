//SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_line::LogLine;
use std::fmt::Debug;

pub trait LineSink: Debug + Send + Sync {
    /**
        Writes one rendered line.

        Errors are returned to the caller of [`ScopeLogger::log`](crate::ScopeLogger::log)
        unchanged; the logger does not retry or swallow them.
    */
    fn emit(&self, line: &LogLine<'_>) -> std::io::Result<()>;

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn flush(&self) -> std::io::Result<()>;
}

/*
Boilerplate notes.

# LineSink

Clone on a sink doesn't make sense, sinks are shared behind Arc.
PartialEq and Eq are possible but it's unclear whether we mean the destination or the instance.  Not implemented.
Default is not sensible, who knows where a sink writes.
Send/Sync are required, since the root logger and its sink are reachable from every thread.
*/
