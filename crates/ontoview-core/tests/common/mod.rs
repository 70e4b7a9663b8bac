//! Common test utilities for integration tests.
//!
//! Builds small on-disk ontology trees in a temporary directory. Every
//! fixture ontology `name` is written to `name.ttl`, declares the ontology
//! IRI `http://example.org/name`, one class `http://example.org/name#Thing`
//! and one blank-node restriction, so imports resolve by filename
//! convention.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ontoview_config::{OntoviewConfig, SetConfig, VersionConfig};

pub const NS: &str = "http://example.org/";

/// Ontology IRI of fixture `name`.
pub fn iri(name: &str) -> String {
    format!("{}{}", NS, name)
}

/// IRI of the class declared by fixture `name`.
pub fn thing(name: &str) -> String {
    format!("{}{}#Thing", NS, name)
}

/// Turtle source for fixture `name` importing `imports`.
pub fn ontology_ttl(name: &str, imports: &[&str]) -> String {
    let mut header = vec![
        format!("<{}> a owl:Ontology", iri(name)),
        format!("rdfs:label \"{}\"", name),
        "owl:versionInfo \"1.0.0\"".to_string(),
    ];
    if !imports.is_empty() {
        let targets: Vec<String> = imports.iter().map(|i| format!("<{}>", iri(i))).collect();
        header.push(format!("owl:imports {}", targets.join(" , ")));
    }

    format!(
        r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix ex: <{ns}{name}#> .

{header} .

ex:Thing a owl:Class ;
    rdfs:label "{name} thing"@en ;
    rdfs:subClassOf [ a owl:Restriction ] .
"#,
        ns = NS,
        name = name,
        header = header.join(" ;\n    "),
    )
}

/// Temporary directory of fixture ontologies.
pub struct OntologyDir {
    dir: TempDir,
    root: PathBuf,
}

impl OntologyDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = std::fs::canonicalize(dir.path()).expect("Failed to canonicalize temp dir");
        Self { dir, root }
    }

    /// Canonical path of the directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Write fixture `name` as `name.ttl` at the top level.
    pub fn ontology(&self, name: &str, imports: &[&str]) -> PathBuf {
        self.write(&format!("{}.ttl", name), &ontology_ttl(name, imports))
    }

    /// Write fixture `name` as `dir/name.ttl`.
    pub fn ontology_in(&self, dir: &str, name: &str, imports: &[&str]) -> PathBuf {
        self.write(&format!("{}/{}.ttl", dir, name), &ontology_ttl(name, imports))
    }
}

/// A set with one version per `(version, root_path)` pair; the first is the
/// default.
pub fn set_config<P: AsRef<Path>>(id: &str, versions: &[(&str, P)]) -> SetConfig {
    SetConfig {
        id: id.to_string(),
        versions: versions
            .iter()
            .enumerate()
            .map(|(i, (version, root))| VersionConfig {
                version: version.to_string(),
                root_path: root.as_ref().to_path_buf(),
                default: i == 0,
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// Config with the given sets and cache capacity.
pub fn config(sets: Vec<SetConfig>, capacity: usize) -> OntoviewConfig {
    let mut config = OntoviewConfig {
        sets,
        ..Default::default()
    };
    config.cache.capacity = capacity;
    config
}
