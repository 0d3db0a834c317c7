use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::params::split_top_level;

static SPACED_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*([(),:{};])\s*").unwrap());
static ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[\s*\]\s*").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").unwrap());
static TRAILING_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s\]>*&])([A-Za-z_]\w*)$").unwrap());

/// What a code sample reveals about a callback's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSignature {
    pub return_type: Option<String>,
    pub names: Vec<String>,
    pub is_static: bool,
}

/// Code example syntaxes found in historical documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `[static] function Name(a : T, b) [: R] {`
    Prototype,
    /// `[modifiers] R Name(T a, U b)`
    Static,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Prototype, Dialect::Static];

    fn pattern(self, name: &str) -> Option<Regex> {
        let name = regex::escape(name);
        let src = match self {
            Dialect::Prototype => format!(
                r"(?:^|[\s;{{}}])(static )?function {name} \( ([^()]*?) ?\) ?(?:: ([\w.\[\]<>]+) ?)?\{{"
            ),
            Dialect::Static => format!(
                r"(?:^|[\s;{{}}\]])((?:(?:public|private|protected|internal|static|override|virtual|new|sealed|unsafe|async) )*)([\w.]+(?:<[^()]*?>)?(?:\[\])*) {name} \( ([^()]*?) ?\)"
            ),
        };
        Regex::new(&src).ok()
    }

    /// Try this dialect against already-normalized example text. Every
    /// occurrence of the callback is tried in order, so calls such as
    /// `return Name(..)` are passed over in favour of the declaration.
    pub fn parse(self, name: &str, text: &str) -> Option<ExampleSignature> {
        let re = self.pattern(name)?;
        let found = re.captures_iter(text).find_map(|caps| self.signature(&caps));
        found
    }

    fn signature(self, caps: &Captures) -> Option<ExampleSignature> {
        match self {
            Dialect::Prototype => {
                let params = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                Some(ExampleSignature {
                    return_type: caps.get(3).map(|m| normalize_return(m.as_str())),
                    names: split_params(params).map(prototype_name).collect(),
                    is_static: caps.get(1).is_some(),
                })
            }
            Dialect::Static => {
                let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let ret = caps.get(2)?.as_str();
                // "public static Name(" would otherwise read the modifier as a return type
                if is_modifier(ret) {
                    return None;
                }
                let params = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                Some(ExampleSignature {
                    return_type: Some(normalize_return(ret)),
                    names: split_params(params).map(trailing_name).collect(),
                    is_static: modifiers.split_whitespace().any(|m| m == "static"),
                })
            }
        }
    }
}

/// Run every dialect in order; the first match wins.
pub fn parse_example(name: &str, raw: &str) -> Option<ExampleSignature> {
    let text = normalize(raw);
    Dialect::ALL.iter().find_map(|d| d.parse(name, &text))
}

/// Drop comments, collapse whitespace, give punctuation single spaces and
/// split `[]` from the identifier that follows it, so both dialect patterns
/// see one layout.
pub fn normalize(raw: &str) -> String {
    let uncommented = COMMENT_RE.replace_all(raw, " ");
    let collapsed = super::normalize_ws(&uncommented);
    let arrays = ARRAY_RE.replace_all(&collapsed, "[] ");
    let spaced = SPACED_PUNCT_RE.replace_all(&arrays, " $1 ");
    super::normalize_ws(&spaced)
}

fn split_params(params: &str) -> impl Iterator<Item = &str> {
    split_top_level(params).into_iter()
}

fn prototype_name(param: &str) -> String {
    param
        .split(':')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// `Collision other` → `other`; a lone type such as `int` has no name.
fn trailing_name(param: &str) -> String {
    let decl = param.split('=').next().unwrap_or("").trim();
    if decl.split_whitespace().count() < 2 {
        return String::new();
    }
    TRAILING_IDENT_RE
        .captures(decl)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn normalize_return(ret: &str) -> String {
    if ret.eq_ignore_ascii_case("void") {
        "void".to_string()
    } else {
        ret.to_string()
    }
}

fn is_modifier(word: &str) -> bool {
    matches!(
        word,
        "public" | "private" | "protected" | "internal" | "static" | "override" | "virtual"
            | "new" | "sealed" | "unsafe" | "async" | "return" | "function"
    )
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_layout() {
        assert_eq!(normalize("void  Foo(int[]x,\n string y){"), "void Foo ( int[] x , string y ) {");
        assert_eq!(normalize("function Bar (a:int) : void{"), "function Bar ( a : int ) : void {");
    }

    #[test]
    fn prototype_with_types_and_return() {
        let src = "#pragma strict\nfunction OnCollisionEnter(collision : Collision) : void {\n  Debug.Log(collision);\n}";
        let sig = parse_example("OnCollisionEnter", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("void"));
        assert_eq!(sig.names, vec!["collision"]);
        assert!(!sig.is_static);
    }

    #[test]
    fn prototype_without_return_or_types() {
        let sig = parse_example("OnTriggerExit", "function OnTriggerExit (other) {\n}").unwrap();
        assert_eq!(sig.return_type, None);
        assert_eq!(sig.names, vec!["other"]);
    }

    #[test]
    fn prototype_static() {
        let sig = parse_example("OnPostprocessAllAssets", "static function OnPostprocessAllAssets(imported : String[], deleted : String[]) {}").unwrap();
        assert!(sig.is_static);
        assert_eq!(sig.names, vec!["imported", "deleted"]);
    }

    #[test]
    fn static_dialect_names_and_return() {
        let src = "using UnityEngine;\npublic class Example : MonoBehaviour {\n    void OnCollisionEnter(Collision collision) {\n    }\n}";
        let sig = parse_example("OnCollisionEnter", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("void"));
        assert_eq!(sig.names, vec!["collision"]);
        assert!(!sig.is_static);
    }

    #[test]
    fn static_dialect_modifiers_and_coroutine_return() {
        let src = "private IEnumerator Start() { yield return null; }";
        let sig = parse_example("Start", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("IEnumerator"));
        assert!(sig.names.is_empty());

        let src = "public static void OnPostprocessAllAssets(string[]importedAssets, string[] deletedAssets) {}";
        let sig = parse_example("OnPostprocessAllAssets", src).unwrap();
        assert!(sig.is_static);
        assert_eq!(sig.names, vec!["importedAssets", "deletedAssets"]);
    }

    #[test]
    fn static_dialect_ref_and_type_only_params() {
        let src = "bool OnValidate(ref Rect r, int) { return true; }";
        let sig = parse_example("OnValidate", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("bool"));
        assert_eq!(sig.names, vec!["r".to_string(), String::new()]);
    }

    #[test]
    fn prototype_wins_over_static_reading() {
        // "function" must not be read as a return type
        let sig = parse_example("Update", "function Update () : void { }").unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("void"));
    }

    #[test]
    fn unrelated_or_malformed_examples_yield_nothing() {
        assert_eq!(parse_example("Awake", "void Start() {}"), None);
        assert_eq!(parse_example("Awake", "void Awake( {"), None);
        assert_eq!(parse_example("Awake", ""), None);
        assert_eq!(parse_example("Awake", "Awake();"), None);
    }

    #[test]
    fn comments_mentioning_the_callback_are_ignored() {
        let src = "// Call OnFoo(x) when ready\nvoid OnFoo(int count) {}";
        let sig = parse_example("OnFoo", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("void"));
        assert_eq!(sig.names, vec!["count"]);

        let src = "/* OnFoo(a, b)\n is legacy */ public bool OnFoo(string label) { return true; }";
        let sig = parse_example("OnFoo", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("bool"));
        assert_eq!(sig.names, vec!["label"]);
    }

    #[test]
    fn call_sites_before_the_declaration_are_skipped() {
        let src = "IEnumerator Other() { return OnFoo(1); }\nvoid OnFoo(int count) {}";
        let sig = parse_example("OnFoo", src).unwrap();
        assert_eq!(sig.return_type.as_deref(), Some("void"));
        assert_eq!(sig.names, vec!["count"]);
    }

    #[test]
    fn generic_parameters_keep_positions() {
        let src = "void OnData(Dictionary<string, int> map, int count) {}";
        let sig = parse_example("OnData", src).unwrap();
        assert_eq!(sig.names, vec!["map", "count"]);
    }

    #[test]
    fn callback_name_is_matched_literally() {
        assert_eq!(parse_example("On.Enable", "void OnXEnable() {}"), None);
    }
}
