// SPDX-License-Identifier: MIT OR Apache-2.0

/*!
Call instrumentation: log a line when a function is called, and run the call one
level deeper.

There are two ways to instrument a call.

The `#[instrument]` attribute reads the parameter names from the function
signature and wraps the body:

```rust
#[scopelog::instrument(|args| format!("add({}, {})", args["a"], args["b"]))]
fn add(a: u32, b: u32) -> u32 {
    scopelog::log("adding").unwrap();
    a + b
}
# assert_eq!(add(1, 2), 3);
```

[`Instrument`] does the same at a call site, and returns instrumentation failures
instead of panicking:

```rust
use scopelog::{InMemorySink, ScopeLogger, numbered_indent};
use std::sync::Arc;

let sink = Arc::new(InMemorySink::new());
let _root = ScopeLogger::new("", numbered_indent(), sink.clone()).install();

let sum = scopelog::instrument(|args: &scopelog::BoundArgs| format!("add({}, {})", args["a"], args["b"]))
    .params(&["a", "b"])
    .call(&[&1, &2], &[], || {
        scopelog::log("adding").unwrap();
        3
    })
    .unwrap();

assert_eq!(sum, 3);
assert_eq!(sink.drain_logs(), "1. add(1, 2)\n1. 1. adding");
```

# Messages

A [`Message`] is either a literal, logged as-is, or a function of the
[`BoundArgs`] of the call. Arguments are bound only for computed messages. The
message is produced before anything is logged: if a message function panics,
nothing is logged and no scope is entered.
*/

use crate::arg_value::ArgValue;
use crate::bound_args::BoundArgs;
use crate::error::Result;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// What an instrumented call logs.
#[derive(Clone)]
pub enum Message {
    /// Logged verbatim, sigils included.
    Literal(String),
    /// Computed from the bound arguments of each call.
    Computed(Arc<dyn Fn(&BoundArgs) -> String + Send + Sync>),
}

impl Message {
    /// Wraps a message function.
    pub fn computed<F, M>(f: F) -> Message
    where
        F: Fn(&BoundArgs) -> M + Send + Sync + 'static,
        M: Into<String>,
    {
        Message::Computed(Arc::new(move |args| f(args).into()))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Message::Computed(_))
    }

    /// Produces the message text, calling `bind` only for a computed message.
    pub fn render(&self, bind: impl FnOnce() -> BoundArgs) -> String {
        match self {
            Message::Literal(s) => s.clone(),
            Message::Computed(f) => f(&bind()),
        }
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Message::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Literal(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Literal(s)
    }
}

impl<F> From<F> for Message
where
    F: Fn(&BoundArgs) -> String + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Message::Computed(Arc::new(f))
    }
}

/// A reusable instrumentation: a message plus the parameter names of the
/// instrumented callable.
///
/// Build one with [`instrument`].
#[derive(Debug, Clone)]
pub struct Instrument {
    message: Message,
    params: Vec<&'static str>,
}

/// Starts an [`Instrument`] that logs `message`.
pub fn instrument(message: impl Into<Message>) -> Instrument {
    Instrument {
        message: message.into(),
        params: Vec::new(),
    }
}

impl Instrument {
    /// Declares the parameter names positional arguments are bound to, in order.
    pub fn params(mut self, names: &[&'static str]) -> Self {
        self.params = names.to_vec();
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Binds positional arguments to the declared names, then binds `keyword` on
    /// top of them.
    pub fn bind(
        &self,
        positional: &[&dyn ArgValue],
        keyword: &[(&'static str, &dyn ArgValue)],
    ) -> BoundArgs {
        let mut args = BoundArgs::bind_positional(&self.params, positional);
        for (name, value) in keyword {
            args.bind(*name, *value);
        }
        args
    }

    /// The text that a call with these arguments logs.
    pub fn render(
        &self,
        positional: &[&dyn ArgValue],
        keyword: &[(&'static str, &dyn ArgValue)],
    ) -> String {
        self.message.render(|| self.bind(positional, keyword))
    }

    /// Logs the message in the ambient logger, then runs `body` with the returned
    /// child logger ambient.
    ///
    /// # Errors
    ///
    /// Whatever [`ScopeLogger::log`](crate::ScopeLogger::log) returns, in which case
    /// `body` doesn't run, and an underflow when leaving the scope, in which case it
    /// already did.
    pub fn call<R>(
        &self,
        positional: &[&dyn ArgValue],
        keyword: &[(&'static str, &dyn ArgValue)],
        body: impl FnOnce() -> R,
    ) -> Result<R> {
        let message = self.render(positional, keyword);
        let guard = crate::log(message)?.enter();
        let r = body();
        guard.exit()?;
        Ok(r)
    }

    /// The asynchronous form of [`call`](Instrument::call).
    ///
    /// The message is rendered now, so the arguments don't have to outlive the
    /// returned future. It is logged when the future is first polled, in whatever
    /// logger is ambient at that point, and `fut` then runs with the child logger
    /// ambient.
    pub fn call_async<F: Future>(
        &self,
        positional: &[&dyn ArgValue],
        keyword: &[(&'static str, &dyn ArgValue)],
        fut: F,
    ) -> impl Future<Output = Result<F::Output>> + use<F> {
        let message = self.render(positional, keyword);
        async move {
            let child = crate::log(message)?;
            Ok(child.scoped(fut).await)
        }
    }
}
