use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Class,
    Struct,
}

impl Kind {
    /// Maps the kind word from a subtitle line. Anything that is not
    /// recognisably a struct is treated as a class.
    pub fn from_word(word: Option<&str>) -> Kind {
        match word.map(|w| w.trim().to_ascii_lowercase()).as_deref() {
            Some("struct") => Kind::Struct,
            _ => Kind::Class,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Class => "class",
            Kind::Struct => "struct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

/// One callback as documented by a single version's detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    pub name: String,
    pub is_static: bool,
    pub is_coroutine: bool,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub description: String,
    pub path: String,
    pub version: Version,
}

/// A signature snapshot valid over `[min_version, max_version]`.
#[derive(Debug, Clone)]
pub struct Shape {
    pub min_version: Version,
    pub max_version: Version,
    pub is_static: bool,
    pub is_coroutine: bool,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub description: String,
    pub path: String,
}

impl Shape {
    fn open(obs: &RawObservation, version: &Version) -> Shape {
        Shape {
            min_version: version.clone(),
            max_version: version.clone(),
            is_static: obs.is_static,
            is_coroutine: obs.is_coroutine,
            return_type: obs.return_type.clone(),
            parameters: obs.parameters.clone(),
            description: obs.description.clone(),
            path: obs.path.clone(),
        }
    }
}

/// Structural identity of a shape: flags, return type and the ordered
/// parameter name/type list. Descriptions and paths are not compared.
pub fn shapes_match(shape: &Shape, obs: &RawObservation) -> bool {
    shape.is_static == obs.is_static
        && shape.is_coroutine == obs.is_coroutine
        && shape.return_type == obs.return_type
        && shape.parameters.len() == obs.parameters.len()
        && shape
            .parameters
            .iter()
            .zip(&obs.parameters)
            .all(|(a, b)| a.name == b.name && a.type_name == b.type_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First observation of the callback.
    Open,
    /// Same shape seen again; upper bound raised.
    Extend,
    /// Shape changed; previous one closed, new one opened.
    Branch,
}

#[derive(Debug, Clone)]
pub struct CallbackEntry {
    pub name: String,
    shapes: Vec<Shape>,
}

impl CallbackEntry {
    fn new(name: &str) -> Self {
        CallbackEntry {
            name: name.to_string(),
            shapes: Vec::new(),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    fn observe(&mut self, obs: &RawObservation, version: &Version) -> Result<Transition> {
        let Some(last) = self.shapes.len().checked_sub(1) else {
            self.shapes.push(Shape::open(obs, version));
            return Ok(Transition::Open);
        };
        let latest = &mut self.shapes[last];

        if *version < latest.max_version {
            return Err(CatalogError::VersionOrder {
                callback: self.name.clone(),
                latest: latest.max_version.to_string(),
                incoming: version.to_string(),
            });
        }

        if shapes_match(latest, obs) {
            latest.max_version = version.clone();
            latest.description = obs.description.clone();
            latest.path = obs.path.clone();
            Ok(Transition::Extend)
        } else {
            // An equal version with a different shape would overlap the open range.
            if *version == latest.max_version {
                return Err(CatalogError::VersionOrder {
                    callback: self.name.clone(),
                    latest: latest.max_version.to_string(),
                    incoming: version.to_string(),
                });
            }
            self.shapes.push(Shape::open(obs, version));
            Ok(Transition::Branch)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiType {
    pub namespace: String,
    pub name: String,
    pub kind: Kind,
    pub path: String,
    entries: BTreeMap<String, CallbackEntry>,
}

impl ApiType {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &CallbackEntry> {
        self.entries.values()
    }

    pub fn entry(&self, name: &str) -> Option<&CallbackEntry> {
        self.entries.get(name)
    }

    pub fn merge_event_function(
        &mut self,
        obs: &RawObservation,
        version: &Version,
    ) -> Result<Transition> {
        let qualified = self.qualified_name();
        let entry = self
            .entries
            .entry(obs.name.clone())
            .or_insert_with(|| CallbackEntry::new(&obs.name));
        let transition = entry.observe(obs, version)?;
        match transition {
            Transition::Branch => info!(
                "{}.{} changed shape at {} ({} shapes)",
                qualified,
                obs.name,
                version,
                entry.shapes.len()
            ),
            _ => debug!("{}.{} {:?} at {}", qualified, obs.name, transition, version),
        }
        Ok(transition)
    }
}

/// Longitudinal registry of every type observed across a version sweep.
#[derive(Debug, Default)]
pub struct Catalog {
    types: BTreeMap<(String, String), ApiType>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the type for `(namespace, name)`, creating it on first use.
    /// Kind and path of the first observation are retained.
    pub fn add_type(
        &mut self,
        namespace: &str,
        name: &str,
        kind: Option<Kind>,
        path: &str,
        version: &Version,
    ) -> &mut ApiType {
        self.types
            .entry((namespace.to_string(), name.to_string()))
            .or_insert_with(|| {
                debug!("new type {}.{} at {}", namespace, name, version);
                ApiType {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    kind: kind.unwrap_or(Kind::Class),
                    path: path.to_string(),
                    entries: BTreeMap::new(),
                }
            })
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&ApiType> {
        self.types.get(&(namespace.to_string(), name.to_string()))
    }

    /// Types ordered by (namespace, name).
    pub fn types(&self) -> impl Iterator<Item = &ApiType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn param(name: &str, ty: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            type_name: ty.to_string(),
            description: String::new(),
        }
    }

    fn obs(version: &str, params: Vec<Parameter>) -> RawObservation {
        RawObservation {
            name: "OnCollisionEnter".to_string(),
            is_static: false,
            is_coroutine: false,
            return_type: "void".to_string(),
            parameters: params,
            description: "Called on collision.".to_string(),
            path: "MonoBehaviour.OnCollisionEnter.html".to_string(),
            version: v(version),
        }
    }

    fn behaviour(catalog: &mut Catalog) -> &mut ApiType {
        catalog.add_type("UnityEngine", "MonoBehaviour", Some(Kind::Class), "MonoBehaviour.html", &v("1.0"))
    }

    #[test]
    fn same_observation_twice_keeps_one_shape() {
        let mut catalog = Catalog::new();
        let o = obs("1.0", vec![param("other", "UnityEngine.Collision")]);
        let ty = behaviour(&mut catalog);
        assert_eq!(ty.merge_event_function(&o, &v("1.0")).unwrap(), Transition::Open);
        assert_eq!(ty.merge_event_function(&o, &v("1.0")).unwrap(), Transition::Extend);
        assert_eq!(ty.entry("OnCollisionEnter").unwrap().shapes().len(), 1);
    }

    #[test]
    fn unchanged_signature_extends_range() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        let p = vec![param("other", "UnityEngine.Collision")];
        ty.merge_event_function(&obs("1.0", p.clone()), &v("1.0")).unwrap();
        ty.merge_event_function(&obs("2.0", p), &v("2.0")).unwrap();
        let shapes = ty.entry("OnCollisionEnter").unwrap().shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].min_version, v("1.0"));
        assert_eq!(shapes[0].max_version, v("2.0"));
    }

    #[test]
    fn description_change_is_not_a_new_shape() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        let first = obs("1.0", vec![]);
        let mut second = obs("2.0", vec![]);
        second.description = "Reworded.".to_string();
        ty.merge_event_function(&first, &v("1.0")).unwrap();
        assert_eq!(ty.merge_event_function(&second, &v("2.0")).unwrap(), Transition::Extend);
        let shapes = ty.entry("OnCollisionEnter").unwrap().shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].description, "Reworded.");
    }

    #[test]
    fn parameter_type_change_branches() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        ty.merge_event_function(&obs("1.0", vec![param("other", "int")]), &v("1.0"))
            .unwrap();
        ty.merge_event_function(&obs("2.0", vec![param("other", "int")]), &v("2.0"))
            .unwrap();
        let t = ty
            .merge_event_function(&obs("3.0", vec![param("other", "float")]), &v("3.0"))
            .unwrap();
        assert_eq!(t, Transition::Branch);
        let shapes = ty.entry("OnCollisionEnter").unwrap().shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!((shapes[0].min_version.to_string(), shapes[0].max_version.to_string()), ("1.0".into(), "2.0".into()));
        assert_eq!((shapes[1].min_version.to_string(), shapes[1].max_version.to_string()), ("3.0".into(), "3.0".into()));
    }

    #[test]
    fn ranges_are_disjoint_and_cover_observed_versions() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        let a = vec![param("a", "int")];
        let b = vec![param("b", "int")];
        let sweep = [("1.0", &a), ("1.1", &a), ("2.0", &b), ("2.1", &a), ("3.0", &a)];
        for (ver, p) in sweep {
            ty.merge_event_function(&obs(ver, p.clone()), &v(ver)).unwrap();
        }
        let shapes = ty.entry("OnCollisionEnter").unwrap().shapes();
        let ranges: Vec<(String, String)> = shapes
            .iter()
            .map(|s| (s.min_version.to_string(), s.max_version.to_string()))
            .collect();
        assert_eq!(
            ranges,
            vec![
                ("1.0".to_string(), "1.1".to_string()),
                ("2.0".to_string(), "2.0".to_string()),
                ("2.1".to_string(), "3.0".to_string()),
            ]
        );
        for pair in shapes.windows(2) {
            assert!(pair[0].max_version < pair[1].min_version);
        }
    }

    #[test]
    fn flag_change_branches() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        ty.merge_event_function(&obs("1.0", vec![]), &v("1.0")).unwrap();
        let mut co = obs("2.0", vec![]);
        co.is_coroutine = true;
        assert_eq!(ty.merge_event_function(&co, &v("2.0")).unwrap(), Transition::Branch);
    }

    #[test]
    fn older_version_is_rejected() {
        let mut catalog = Catalog::new();
        let ty = behaviour(&mut catalog);
        ty.merge_event_function(&obs("2.0", vec![]), &v("2.0")).unwrap();
        let err = ty.merge_event_function(&obs("1.0", vec![]), &v("1.0"));
        assert!(matches!(err, Err(CatalogError::VersionOrder { .. })));
        assert_eq!(ty.entry("OnCollisionEnter").unwrap().shapes().len(), 1);
    }

    #[test]
    fn add_type_is_idempotent_and_keeps_first_kind() {
        let mut catalog = Catalog::new();
        catalog.add_type("NS", "Foo", None, "Foo.html", &v("1.0"));
        catalog.add_type("NS", "Foo", Some(Kind::Struct), "Other.html", &v("2.0"));
        assert_eq!(catalog.len(), 1);
        let ty = catalog.get("NS", "Foo").unwrap();
        assert_eq!(ty.kind, Kind::Class);
        assert_eq!(ty.path, "Foo.html");
        assert_eq!(ty.qualified_name(), "NS.Foo");
    }

    #[test]
    fn unknown_kind_word_falls_back_to_class() {
        assert_eq!(Kind::from_word(Some("struct")), Kind::Struct);
        assert_eq!(Kind::from_word(Some("Struct")), Kind::Struct);
        assert_eq!(Kind::from_word(Some("interface")), Kind::Class);
        assert_eq!(Kind::from_word(None), Kind::Class);
    }
}
