//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# scopelog

scopelog is a hierarchical logging library for Rust: every line is numbered and
indented by *where* in the call tree it was logged, rather than tagged with a level.

# Development status

scopelog is experimental and the API may change.

# The problem

Print-style tracing of a program with nested steps quickly turns into a wall of
text. Which `"opening file"` belongs to which `"loading config"`? Passing an indent
counter through every function is tedious, and it breaks as soon as a function is
called from two places.

scopelog keeps that counter for you. Each thread (and each instrumented future)
has an *ambient* logger; logging a line returns a child logger one level deeper,
and entering that child makes everything logged inside the scope nest under the
line.

```text
[GLOBAL] build
[GLOBAL]  resolve deps
[GLOBAL]   fetch index
[GLOBAL]  compile
[GLOBAL] done
```

# The API

The simplest entry point is [`log`], which logs through the ambient logger:

```rust
let child = scopelog::log("build").unwrap();
{
    let _scope = child.enter();
    scopelog::log("resolve deps").unwrap();
}
scopelog::log!("done in {} steps", 2).unwrap();
```

Messages can also move between levels by themselves. A message ending in `:` opens
a level below it; a message starting with `:` closes one and is logged at the
parent level:

```rust
# use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
# use std::sync::Arc;
# let sink = Arc::new(InMemorySink::new());
# let _root = ScopeLogger::new("", numbered_indent(), sink.clone()).install();
scopelog::log("checks:").unwrap();
scopelog::log("disk").unwrap();
scopelog::log("network").unwrap();
scopelog::log(":all passed").unwrap();
assert_eq!(sink.drain_logs(), "1. checks\n1. 1. disk\n1. 2. network\n1. all passed");
```

# Instrumentation

The [`macro@instrument`] attribute logs a line every time a function is called and
runs the body one level deeper. The message is either a literal or a function of the
call's arguments:

```rust
#[scopelog::instrument(|args| format!("fib({})", args["n"]))]
fn fib(n: u32) -> u32 {
    if n < 2 { n } else { fib(n - 1) + fib(n - 2) }
}
# assert_eq!(fib(3), 2);
```

`async fn`s are instrumented the same way, and [`Instrument`] offers the same
behavior for call sites that want errors returned rather than panics.

# Configuration

By default the root logger is labelled `GLOBAL`, indents with one space per level
and prints to stdout. Replace it at startup with [`set_root_logger`], or install a
logger for one thread or one test with [`ScopeLogger::install`]. Output goes to a
[`LineSink`]; [`StdoutSink`] and [`InMemorySink`] are provided.

# Multithreading

Each thread has its own ambient logger, so scopes entered on one thread never affect
another. Futures carry their scope with them through [`ScopeLogger::scoped`], so
interleaved tasks on one executor thread don't see each other's scopes either. To
run a future on another thread inside the current scope, wrap it with
`scopelog::current_logger().apply(fut)`.
*/

mod arg_value;
mod bound_args;
mod error;
mod indent;
mod inmemory_sink;
mod instrument;
mod log_line;
pub mod root;
pub mod scope;
mod sink;
mod stdout_sink;

pub use arg_value::{ArgValue, LogIt};
pub use bound_args::BoundArgs;
pub use error::{Result, ScopeError};
pub use indent::{
    IndentStrategy, NoneIndent, NumberedIndent, SpaceIndent, none_indent, numbered_indent,
    space_indent,
};
pub use inmemory_sink::InMemorySink;
pub use instrument::{Instrument, Message, instrument};
pub use log_line::LogLine;
pub use root::{ROOT_LABEL, root_logger, set_root_logger};
pub use scope::{SIGIL, ScopeGuard, ScopeLogger, Scoped};
pub use sink::LineSink;
pub use stdout_sink::StdoutSink;

pub use scopelog_proc::instrument;

/// The ambient logger of the current thread.
///
/// Shorthand for [`ScopeLogger::current`].
pub fn current_logger() -> ScopeLogger {
    ScopeLogger::current()
}

/**
Logs `message` through the ambient logger.

Returns the child logger for the scope under this line; see [`ScopeLogger::log`]
for how sigils are handled.

```rust
let child = scopelog::log("connecting").unwrap();
assert_eq!(child.nesting_level(), scopelog::current_logger().nesting_level() + 1);
```
*/
pub fn log(message: impl AsRef<str>) -> Result<ScopeLogger> {
    ScopeLogger::current().log(message)
}

/**
Formats a message and logs it through the ambient logger.

Takes the same arguments as [`format!`] and returns what [`log`](fn@log) returns.

```rust
let attempt = 2;
scopelog::log!("retrying, attempt {attempt}").unwrap();
```
*/
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::log(::std::format!($($arg)*))
    };
}

#[doc(hidden)]
pub mod hidden {
    use crate::arg_value::ArgValue;
    use crate::bound_args::BoundArgs;
    use crate::instrument::Message;
    use crate::scope::ScopeGuard;
    use std::future::Future;

    pub fn render_message(
        message: Message,
        params: &[&'static str],
        positional: &[&dyn ArgValue],
    ) -> String {
        message.render(|| BoundArgs::bind_positional(params, positional))
    }

    pub fn enter_instrumented(
        message: Message,
        params: &[&'static str],
        positional: &[&dyn ArgValue],
    ) -> ScopeGuard {
        let message = render_message(message, params, positional);
        match crate::log(message) {
            Ok(child) => child.enter(),
            Err(e) => panic!("scopelog instrumentation failed: {e}"),
        }
    }

    pub async fn enter_instrumented_async<F: Future>(message: String, fut: F) -> F::Output {
        let child = match crate::log(message) {
            Ok(child) => child,
            Err(e) => panic!("scopelog instrumentation failed: {e}"),
        };
        child.scoped(fut).await
    }
}

extern crate self as scopelog;
