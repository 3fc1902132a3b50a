// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
How call arguments are shown to message functions.

An instrumented call renders each argument to a string before it runs, so the message
function sees plain text and the arguments themselves can be moved into the call.
*/
use std::fmt::Debug;

pub trait ArgValue {
    /**
    Renders the argument for a message function.

    Use the representation a person would expect when reading the log: `42`, `alice`,
    not `"alice"`.

    When implementing this, use of `#[inline]` is recommended.
    */
    fn render_arg(&self) -> String;
}

macro_rules! display_arg {
    ($($t:ty),* $(,)?) => {
        $(
            impl ArgValue for $t {
                #[inline]
                fn render_arg(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_arg!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
    String, str
);

impl<T: ArgValue + ?Sized> ArgValue for &T {
    #[inline]
    fn render_arg(&self) -> String {
        (**self).render_arg()
    }
}

impl<T: ArgValue + ?Sized> ArgValue for &mut T {
    #[inline]
    fn render_arg(&self) -> String {
        (**self).render_arg()
    }
}

impl<T: ArgValue + ?Sized> ArgValue for Box<T> {
    #[inline]
    fn render_arg(&self) -> String {
        (**self).render_arg()
    }
}

impl<T: ArgValue + ?Sized> ArgValue for std::sync::Arc<T> {
    #[inline]
    fn render_arg(&self) -> String {
        (**self).render_arg()
    }
}

/**
Slices render like a list.
*/
impl<T: ArgValue> ArgValue for [T] {
    fn render_arg(&self) -> String {
        let items: Vec<String> = self.iter().map(ArgValue::render_arg).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: ArgValue> ArgValue for Vec<T> {
    #[inline]
    fn render_arg(&self) -> String {
        self.as_slice().render_arg()
    }
}

/**
Option depends on the underlying type.
*/
impl<T: ArgValue> ArgValue for Option<T> {
    fn render_arg(&self) -> String {
        match self {
            Some(t) => format!("Some({})", t.render_arg()),
            None => "None".to_string(),
        }
    }
}

/**
Escape hatch for types without an [`ArgValue`] impl: renders with `Debug`.

```rust
use scopelog::{ArgValue, LogIt};

#[derive(Debug)]
struct Point { x: i32 }
assert_eq!(LogIt(Point { x: 1 }).render_arg(), "Point { x: 1 }");
```
*/
pub struct LogIt<T>(pub T);

impl<T: Debug> ArgValue for LogIt<T> {
    #[inline]
    fn render_arg(&self) -> String {
        format!("{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_render_plainly() {
        assert_eq!(1u8.render_arg(), "1");
        assert_eq!((-3i64).render_arg(), "-3");
        assert_eq!(true.render_arg(), "true");
        assert_eq!("alice".render_arg(), "alice");
        assert_eq!(String::from("bob").render_arg(), "bob");
    }

    #[test]
    fn containers() {
        assert_eq!(vec![1, 2, 3].render_arg(), "[1, 2, 3]");
        assert_eq!(Some(4).render_arg(), "Some(4)");
        assert_eq!(None::<u8>.render_arg(), "None");
        assert_eq!((&&5u16).render_arg(), "5");
    }

    #[test]
    fn logit_uses_debug() {
        assert_eq!(LogIt("quoted").render_arg(), "\"quoted\"");
    }
}
