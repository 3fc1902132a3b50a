//SPDX-License-Identifier: MIT OR Apache-2.0

//! # Scopelog Procedural Macros
//!
//! This crate provides the `#[instrument]` attribute for the scopelog logging library.
//! Use it through the re-export, `#[scopelog::instrument(...)]`.
//!
//! ## Architecture
//!
//! The attribute rewrites only the body of the function it is applied to. The signature
//! is kept as written, so instrumented functions are called exactly like before.
//!
//! For a synchronous `fn`, the new body:
//! 1. renders the message (binding the arguments if the message is a function)
//! 2. logs it through the ambient logger
//! 3. holds a scope guard for the child logger while the original body runs
//!
//! For an `async fn`, the original body is moved into an `async move` block that is
//! wrapped in `scopelog::Scoped`, so the scope follows the future across `.await`s.
//!
//! ## Usage Example
//!
//! ```rust
//! // This function:
//! #[scopelog::instrument(|args| format!("add({}, {})", args["a"], args["b"]))]
//! fn add(a: u32, b: u32) -> u32 {
//!     a + b
//! }
//! # assert_eq!(add(1, 2), 3);
//!
//! // Expands to approximately:
//! // fn add(a: u32, b: u32) -> u32 {
//! //     let __scopelog_guard = scopelog::hidden::enter_instrumented(
//! //         scopelog::Message::computed(|args| format!(...)),
//! //         &["a", "b"],
//! //         &[&a as &dyn scopelog::ArgValue, &b as &dyn scopelog::ArgValue],
//! //     );
//! //     { a + b }
//! // }
//! ```
//!
//! ## Parameter names
//!
//! Names are read from the signature at compile time. `self` receivers and parameters
//! bound by a pattern other than a plain identifier (`(x, y): (u8, u8)`, `_`) are not
//! bound. Each bound parameter's type must implement `scopelog::ArgValue`; leave out
//! the ones that don't with `skip(..)`.

use proc_macro::TokenStream;

mod instrument_attr;

/// Logs a message each time the function is called and runs its body one scope deeper.
///
/// # Syntax
/// ```ignore
/// #[instrument("literal message")]
/// #[instrument(|args| format!("load({})", args["path"]))]
/// #[instrument(|args| ..., skip(conn, buf))]
/// ```
///
/// The message is either:
/// - a string literal, logged as-is (sigils included), without binding any argument
/// - a closure taking `&scopelog::BoundArgs` and returning the message; positional
///   arguments are bound to the parameter names of the signature
/// - any other expression convertible into `scopelog::Message`
///
/// # Examples
/// ```
/// #[scopelog::instrument("connecting:")]
/// fn connect() {
///     scopelog::log("resolving").unwrap();
/// }
/// # connect();
/// ```
///
/// ```
/// #[derive(Debug)]
/// struct Connection;
///
/// #[scopelog::instrument(|args| format!("send {} bytes", args["len"]), skip(conn))]
/// fn send(conn: &Connection, len: usize) -> bool {
///     len > 0
/// }
/// # assert!(send(&Connection, 3));
/// ```
///
/// `async fn`s keep their scope across suspension points:
/// ```
/// #[scopelog::instrument(|args| format!("fetch({})", args["id"]))]
/// async fn fetch(id: u32) -> u32 {
///     scopelog::log("querying").unwrap();
///     id * 2
/// }
/// ```
///
/// # Panics
///
/// The instrumented function panics if the message can't be logged (a failing sink) or
/// its scope can't be left (mismatched manual scope handling inside the body). Use
/// `scopelog::Instrument` to get these as errors instead.
#[proc_macro_attribute]
pub fn instrument(attr: TokenStream, item: TokenStream) -> TokenStream {
    instrument_attr::instrument_attr_impl(attr, item)
}
