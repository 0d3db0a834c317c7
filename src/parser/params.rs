use crate::model::Parameter;

const PRIMITIVES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long",
    "ulong", "short", "ushort", "object", "string", "void", "dynamic",
];
const QUALIFIERS: &[&str] = &["ref", "out", "in", "params", "this"];

/// One row of a detail page's Parameters table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}

/// Build the positional parameter list for a callback.
///
/// Sources are layered in fixed order, later ones winning where they have a
/// value: signature-derived defaults, then example names, then the
/// Parameters table (names and descriptions).
pub fn resolve(
    signature: &str,
    callback: &str,
    namespace: &str,
    example_names: &[String],
    table: &[ParamDoc],
) -> Vec<Parameter> {
    let tokens = argument_list(signature, callback)
        .map(split_top_level)
        .unwrap_or_default();
    let mut params = apply_defaults(&tokens, namespace);
    overlay_example(&mut params, example_names);
    overlay_table(&mut params, table);
    params
}

/// Text inside the parentheses that follow the callback name, or `None` when
/// the signature carries no argument list.
pub fn argument_list<'a>(signature: &'a str, callback: &str) -> Option<&'a str> {
    let head_end = signature.find('(')?;
    let rest = match signature[..head_end].rfind(callback) {
        Some(i) if !callback.is_empty() => &signature[i + callback.len()..],
        _ => signature,
    };
    let open = rest.find('(')?;
    let close = rest.rfind(')')?;
    if close < open {
        return None;
    }
    Some(&rest[open + 1..close])
}

/// Split on commas that are not nested inside `<>`, `[]` or `()`.
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            ',' if depth <= 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Layer 0: one parameter per signature token with a type and a derived name.
pub fn apply_defaults(tokens: &[&str], namespace: &str) -> Vec<Parameter> {
    tokens
        .iter()
        .map(|token| {
            let decl = strip_qualifiers(token.split('=').next().unwrap_or("").trim());
            let (ty, name) = match split_type_and_name(decl) {
                Some((ty, name)) => (ty, name.to_string()),
                None => (decl, default_name(decl)),
            };
            Parameter {
                name,
                type_name: qualify(ty, namespace),
                description: String::new(),
            }
        })
        .collect()
}

/// Layer 1: example-derived names, by position, where non-empty.
pub fn overlay_example(params: &mut [Parameter], names: &[String]) {
    for (param, name) in params.iter_mut().zip(names) {
        if !name.is_empty() {
            param.name = name.clone();
        }
    }
}

/// Layer 2: Parameters table names and descriptions, by position.
pub fn overlay_table(params: &mut [Parameter], table: &[ParamDoc]) {
    for (param, doc) in params.iter_mut().zip(table) {
        if !doc.name.is_empty() {
            param.name = doc.name.clone();
        }
        if !doc.description.is_empty() {
            param.description = doc.description.clone();
        }
    }
}

fn strip_qualifiers(decl: &str) -> &str {
    let mut rest = decl;
    while let Some((first, tail)) = rest.split_once(char::is_whitespace) {
        if !QUALIFIERS.contains(&first) {
            break;
        }
        rest = tail.trim_start();
    }
    rest
}

/// `int count` → (`int`, `count`); a lone type yields `None`.
fn split_type_and_name(decl: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let mut split = None;
    for (i, c) in decl.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => split = Some(i),
            _ => {}
        }
    }
    let i = split?;
    let (ty, name) = (decl[..i].trim(), decl[i..].trim());
    let is_ident = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if ty.is_empty() || !is_ident {
        return None;
    }
    Some((ty, name))
}

/// `UnityEngine.Collision2D[]` → `collision2D`.
fn default_name(ty: &str) -> String {
    let base = ty.split('<').next().unwrap_or(ty).trim_end_matches("[]");
    let last = base.rsplit('.').next().unwrap_or(base);
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prefix unqualified, non-primitive type names with the owning namespace.
fn qualify(ty: &str, namespace: &str) -> String {
    let base = ty.split('<').next().unwrap_or(ty).trim_end_matches("[]");
    let starts_upper = base.chars().next().is_some_and(|c| c.is_uppercase());
    if namespace.is_empty() || base.contains('.') || !starts_upper || PRIMITIVES.contains(&base) {
        ty.to_string()
    } else {
        format!("{}.{}", namespace, ty)
    }
}

// ── Tests ──
