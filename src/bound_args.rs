// SPDX-License-Identifier: MIT OR Apache-2.0

//! The argument mapping seen by message functions.

use crate::arg_value::ArgValue;
use std::borrow::Cow;
use std::ops::Index;

/**
Parameter name → rendered argument, in binding order.

Built by the instrumentation layer right before a call: positional arguments are
zipped with the declared parameter names, then explicitly named arguments are bound
on top. Binding a name that is already present replaces its value in place, so
the last write wins while the original position is kept.

```rust
use scopelog::BoundArgs;

let mut args = BoundArgs::bind_positional(&["a", "b"], &[&1, &2]);
args.bind("b", &20);
assert_eq!(args["a"], "1");
assert_eq!(args["b"], "20");
assert_eq!(args.len(), 2);
```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArgs {
    entries: Vec<(Cow<'static, str>, String)>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips `values` with `names` by position.
    ///
    /// Values past the end of `names` have no name and are dropped; names past the
    /// end of `values` stay unbound.
    pub fn bind_positional(names: &[&'static str], values: &[&dyn ArgValue]) -> Self {
        let mut args = Self::new();
        for (name, value) in names.iter().zip(values.iter()) {
            args.bind(*name, *value);
        }
        args
    }

    /// Binds `name`, replacing any previous value.
    pub fn bind(&mut self, name: impl Into<Cow<'static, str>>, value: &dyn ArgValue) -> &mut Self {
        self.bind_rendered(name, value.render_arg())
    }

    /// Builder form of [`bind`](Self::bind).
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: &dyn ArgValue) -> Self {
        self.bind(name, value);
        self
    }

    pub(crate) fn bind_rendered(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        rendered: String,
    ) -> &mut Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = rendered,
            None => self.entries.push((name, rendered)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }
}

impl Index<&str> for BoundArgs {
    type Output = String;

    /// # Panics
    ///
    /// If `name` was never bound.
    fn index(&self, name: &str) -> &String {
        match self.entries.iter().find(|(n, _)| n == name) {
            Some((_, v)) => v,
            None => panic!("no argument named `{name}` was bound"),
        }
    }
}
