// SPDX-License-Identifier: MIT OR Apache-2.0
use proc_macro::{Delimiter, Spacing, TokenStream, TokenTree};

/// Implementation of the `#[instrument]` attribute macro.
///
/// Keeps the signature as written and replaces the body with one that logs the
/// message, enters the returned child logger, and then runs the original body.
pub fn instrument_attr_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match InstrumentArgs::parse(attr) {
        Ok(args) => args,
        Err(e) => return compile_error(&e),
    };
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    let sig = match Signature::parse(&tokens) {
        Ok(sig) => sig,
        Err(e) => return compile_error(&e),
    };

    let params = if args.binds_arguments {
        sig.params
            .iter()
            .filter(|p| !args.skip.contains(&p.name))
            .collect::<Vec<_>>()
    } else {
        Vec::new()
    };
    let names = params
        .iter()
        .map(|p| format!("\"{}\"", p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let values = params
        .iter()
        .map(|p| format!("&{} as &dyn scopelog::ArgValue", p.binding))
        .collect::<Vec<_>>()
        .join(", ");

    let original_body = tokens[sig.body_idx].to_string();
    let message = &args.message;
    let new_body_src = if sig.is_async {
        let inner = match &sig.return_type {
            Some(ret) => format!(
                "async move {{ let __scopelog_ret: {ret} = {original_body}; __scopelog_ret }}"
            ),
            None => format!("async move {original_body}"),
        };
        format!(
            r#"{{
                let __scopelog_message = scopelog::hidden::render_message({message}, &[{names}], &[{values}]);
                scopelog::hidden::enter_instrumented_async(__scopelog_message, {inner}).await
            }}"#
        )
    } else {
        format!(
            r#"{{
                let __scopelog_guard = scopelog::hidden::enter_instrumented({message}, &[{names}], &[{values}]);
                {original_body}
            }}"#
        )
    };

    let new_body: TokenStream = match new_body_src.parse() {
        Ok(body) => body,
        Err(_) => return compile_error("#[instrument] could not rewrite the function body"),
    };
    match new_body.into_iter().next() {
        Some(group) => tokens[sig.body_idx] = group,
        None => return compile_error("#[instrument] could not rewrite the function body"),
    }
    tokens.into_iter().collect()
}

fn compile_error(message: &str) -> TokenStream {
    format!("compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}

/// The parsed attribute: `#[instrument(MESSAGE)]` or `#[instrument(MESSAGE, skip(a, b))]`.
struct InstrumentArgs {
    /// An expression of type `scopelog::Message`.
    message: String,
    binds_arguments: bool,
    skip: Vec<String>,
}

impl InstrumentArgs {
    fn parse(attr: TokenStream) -> Result<Self, String> {
        let mut tokens: Vec<TokenTree> = attr.into_iter().collect();
        let mut skip = Vec::new();

        let n = tokens.len();
        if n >= 3 {
            let is_skip = matches!(&tokens[n - 3], TokenTree::Punct(p) if p.as_char() == ',')
                && matches!(&tokens[n - 2], TokenTree::Ident(i) if i.to_string() == "skip")
                && matches!(&tokens[n - 1], TokenTree::Group(g) if g.delimiter() == Delimiter::Parenthesis);
            if is_skip {
                if let TokenTree::Group(g) = &tokens[n - 1] {
                    for t in g.stream() {
                        match t {
                            TokenTree::Ident(i) => skip.push(unraw(&i.to_string())),
                            TokenTree::Punct(p) if p.as_char() == ',' => {}
                            other => {
                                return Err(format!(
                                    "#[instrument] expected parameter names in skip(..), found `{other}`"
                                ));
                            }
                        }
                    }
                }
                tokens.truncate(n - 3);
            }
        }
        //tolerate a trailing comma after the message
        if matches!(tokens.last(), Some(TokenTree::Punct(p)) if p.as_char() == ',') {
            tokens.pop();
        }

        if tokens.is_empty() {
            return Err("#[instrument] requires a message, e.g. #[instrument(\"loading\")]".into());
        }

        let expr: TokenStream = tokens.iter().cloned().collect();
        if tokens.len() == 1 && is_string_literal(&tokens[0]) {
            Ok(InstrumentArgs {
                message: format!("scopelog::Message::from({expr})"),
                binds_arguments: false,
                skip,
            })
        } else if starts_closure(&tokens) {
            //Message::computed drives closure parameter inference
            Ok(InstrumentArgs {
                message: format!("scopelog::Message::computed({expr})"),
                binds_arguments: true,
                skip,
            })
        } else {
            Ok(InstrumentArgs {
                message: format!("scopelog::Message::from({expr})"),
                binds_arguments: true,
                skip,
            })
        }
    }
}

fn is_string_literal(t: &TokenTree) -> bool {
    match t {
        TokenTree::Literal(lit) => {
            let s = lit.to_string();
            s.starts_with('"') || s.starts_with("r\"") || s.starts_with("r#")
        }
        _ => false,
    }
}

fn starts_closure(tokens: &[TokenTree]) -> bool {
    match tokens.first() {
        Some(TokenTree::Punct(p)) => p.as_char() == '|',
        Some(TokenTree::Ident(i)) => i.to_string() == "move",
        _ => false,
    }
}

fn unraw(name: &str) -> String {
    name.strip_prefix("r#").unwrap_or(name).to_string()
}

struct Param {
    /// The name handed to message functions.
    name: String,
    /// The identifier as written in the signature.
    binding: String,
}

struct Signature {
    is_async: bool,
    params: Vec<Param>,
    /// Declared return type, `()` when omitted, `None` when it can't be written in
    /// a `let` (`impl Trait`).
    return_type: Option<String>,
    body_idx: usize,
}

impl Signature {
    fn parse(tokens: &[TokenTree]) -> Result<Self, String> {
        let fn_idx = tokens
            .iter()
            .position(|t| matches!(t, TokenTree::Ident(i) if i.to_string() == "fn"))
            .ok_or("#[instrument] can only be applied to functions")?;
        let is_async = tokens[..fn_idx]
            .iter()
            .any(|t| matches!(t, TokenTree::Ident(i) if i.to_string() == "async"));

        let body_idx = match tokens.last() {
            Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Brace => tokens.len() - 1,
            _ => return Err("#[instrument] requires a function with a body".into()),
        };

        // The parameter list is the first parenthesized group outside the generics.
        let mut depth = AngleDepth::default();
        let mut params_idx = None;
        for (i, t) in tokens.iter().enumerate().take(body_idx).skip(fn_idx + 2) {
            if depth.is_top() {
                if let TokenTree::Group(g) = t {
                    if g.delimiter() == Delimiter::Parenthesis {
                        params_idx = Some(i);
                        break;
                    }
                }
            }
            depth.track(t);
        }
        let params_idx = params_idx.ok_or("#[instrument] could not find the parameter list")?;

        let params = match &tokens[params_idx] {
            TokenTree::Group(g) => parse_params(g.stream()),
            _ => Vec::new(),
        };
        let return_type = parse_return_type(&tokens[params_idx + 1..body_idx]);

        Ok(Signature {
            is_async,
            params,
            return_type,
            body_idx,
        })
    }
}

/// Tracks `<`/`>` nesting in a flat token sequence, ignoring the `>` of `->`.
#[derive(Default)]
struct AngleDepth {
    depth: usize,
    after_dash: bool,
}

impl AngleDepth {
    fn is_top(&self) -> bool {
        self.depth == 0
    }

    fn track(&mut self, t: &TokenTree) {
        let mut dash = false;
        if let TokenTree::Punct(p) = t {
            match p.as_char() {
                '<' => self.depth += 1,
                '>' if !self.after_dash => self.depth = self.depth.saturating_sub(1),
                '-' => dash = p.spacing() == Spacing::Joint,
                _ => {}
            }
        }
        self.after_dash = dash;
    }
}

/// Splits at commas outside of generics.
fn split_top_level(stream: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut parts = vec![Vec::new()];
    let mut depth = AngleDepth::default();
    for t in stream {
        if depth.is_top() && matches!(&t, TokenTree::Punct(p) if p.as_char() == ',') {
            parts.push(Vec::new());
            depth.track(&t);
            continue;
        }
        depth.track(&t);
        if let Some(last) = parts.last_mut() {
            last.push(t);
        }
    }
    parts.retain(|p| !p.is_empty());
    parts
}

fn parse_params(stream: TokenStream) -> Vec<Param> {
    let mut params = Vec::new();
    for part in split_top_level(stream) {
        let mut rest = &part[..];
        // #[attr] on a parameter
        while let [TokenTree::Punct(p), TokenTree::Group(_), tail @ ..] = rest {
            if p.as_char() != '#' {
                break;
            }
            rest = tail;
        }

        let Some(colon) = type_colon(rest) else {
            // self, &self, &mut self
            continue;
        };
        let mut pattern = &rest[..colon];
        while let [TokenTree::Ident(i), tail @ ..] = pattern {
            let s = i.to_string();
            if s != "mut" && s != "ref" {
                break;
            }
            pattern = tail;
        }
        if let [TokenTree::Ident(ident)] = pattern {
            let binding = ident.to_string();
            if binding == "self" || binding == "_" {
                continue;
            }
            params.push(Param {
                name: unraw(&binding),
                binding,
            });
        }
    }
    params
}

/// Index of the `:` between a parameter pattern and its type, skipping `::`.
fn type_colon(tokens: &[TokenTree]) -> Option<usize> {
    for (i, t) in tokens.iter().enumerate() {
        if let TokenTree::Punct(p) = t {
            if p.as_char() != ':' {
                continue;
            }
            let joined_next = p.spacing() == Spacing::Joint;
            let joined_prev = i > 0
                && matches!(&tokens[i - 1], TokenTree::Punct(q) if q.as_char() == ':' && q.spacing() == Spacing::Joint);
            if !joined_next && !joined_prev {
                return Some(i);
            }
        }
    }
    None
}

fn parse_return_type(tokens: &[TokenTree]) -> Option<String> {
    let arrow = tokens.windows(2).position(|w| {
        matches!(&w[0], TokenTree::Punct(p) if p.as_char() == '-' && p.spacing() == Spacing::Joint)
            && matches!(&w[1], TokenTree::Punct(p) if p.as_char() == '>')
    });
    let Some(arrow) = arrow else {
        return Some("()".to_string());
    };
    let ty: Vec<TokenTree> = tokens[arrow + 2..]
        .iter()
        .take_while(|t| !matches!(t, TokenTree::Ident(i) if i.to_string() == "where"))
        .cloned()
        .collect();
    if ty.iter().any(mentions_impl) {
        return None;
    }
    Some(ty.into_iter().collect::<TokenStream>().to_string())
}

fn mentions_impl(t: &TokenTree) -> bool {
    match t {
        TokenTree::Ident(i) => i.to_string() == "impl",
        TokenTree::Group(g) => g.stream().into_iter().any(|t| mentions_impl(&t)),
        _ => false,
    }
}
