//! Loading of YAML test specification documents.
//!
//! A document has two top-level keys:
//!
//! ```yaml
//! Config:
//!   hfst:
//!     App: hfst-lookup
//!     Gen: ../sme.gen.hfst
//!     Morph: ../sme.morph.hfst
//!
//! Tests:
//!   Noun - gåetie:
//!     gåetie+N+Sg+Nom: gåetie
//!     gåetie+N+Pl+Nom: [gåetieh, gåetiem]
//! ```
//!
//! Scalar values are normalised to single-element lists.

use super::{TestEntry, TestGroup, TestSpec};
use crate::config::{MorphOptions, DEFAULT_APP};
use crate::error::{MorphError, MorphResult};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of the `Config` map, as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SectionConfig {
    /// Lookup program command line.
    #[serde(rename = "App", default)]
    pub app: Option<String>,
    /// Generator transducer.
    #[serde(rename = "Gen", default)]
    pub gen: Option<PathBuf>,
    /// Analyser transducer.
    #[serde(rename = "Morph", default)]
    pub morph: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "Config", default)]
    config: Option<BTreeMap<String, SectionConfig>>,
    #[serde(rename = "Tests", default)]
    tests: Option<Mapping>,
}

/// A parsed test specification file.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Where the document was read from.
    pub path: PathBuf,
    /// Sections of the `Config` map by name.
    pub sections: BTreeMap<String, SectionConfig>,
    /// The `Tests` map.
    pub tests: TestSpec,
}

impl SpecDocument {
    /// Read and parse a specification file.
    pub fn load<P: AsRef<Path>>(path: P) -> MorphResult<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| MorphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(path, &yaml)
    }

    /// Parse a specification from YAML text. `path` is only used for
    /// messages and the statistics record.
    pub fn from_yaml_str(path: impl Into<PathBuf>, yaml: &str) -> MorphResult<Self> {
        let path = path.into();
        let raw: RawDocument = serde_yaml::from_str(yaml).map_err(|source| MorphError::Yaml {
            path: path.clone(),
            source,
        })?;

        let sections = raw
            .config
            .ok_or_else(|| MorphError::config("No `Config` found in test file."))?;
        let tests = raw
            .tests
            .ok_or_else(|| MorphError::config("No `Tests` found in test file."))?;

        let mut groups = Vec::with_capacity(tests.len());
        for (name, body) in &tests {
            let name = scalar_to_string(name)
                .ok_or_else(|| MorphError::config("Test group names must be strings."))?;
            groups.push(group_from_value(name, body)?);
        }

        Ok(Self {
            path,
            sections,
            tests: TestSpec::new(groups)?,
        })
    }

    /// Resolve the section selected by `options`, applying CLI overrides and
    /// checking that the program and transducers exist.
    pub fn section(&self, options: &MorphOptions) -> MorphResult<Section> {
        let name = options.section.as_str();
        let config = self.sections.get(name).ok_or_else(|| {
            MorphError::config(format!("'{}' not found in Config of test file.", name))
        })?;

        let app = options
            .app
            .as_deref()
            .or(config.app.as_deref())
            .unwrap_or(DEFAULT_APP);
        let command = ToolCommand::resolve(app)?;

        let gen = options.gen.clone().or_else(|| config.gen.clone());
        let morph = options.morph.clone().or_else(|| config.morph.clone());
        if gen.is_none() && morph.is_none() {
            return Err(MorphError::config("One of Gen or Morph must be configured."));
        }
        for file in gen.iter().chain(morph.iter()) {
            if !file.is_file() {
                return Err(MorphError::FileNotFound(file.clone()));
            }
        }

        Ok(Section {
            name: name.to_string(),
            command,
            gen,
            morph,
        })
    }
}

/// A resolved section: the program to run and the transducers to feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name.
    pub name: String,
    /// Lookup program.
    pub command: ToolCommand,
    /// Generator transducer, if configured.
    pub gen: Option<PathBuf>,
    /// Analyser transducer, if configured.
    pub morph: Option<PathBuf>,
}

/// A tokenised command line whose program was found on the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Command line as configured.
    pub line: String,
    /// Absolute path of the program.
    pub program: PathBuf,
    /// Fixed arguments placed before the transducer file.
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Tokenise `line` and locate its first token on the search path.
    pub fn resolve(line: &str) -> MorphResult<Self> {
        let mut tokens = split_command(line)?.into_iter();
        let name = tokens
            .next()
            .ok_or_else(|| MorphError::config("`App` is empty."))?;
        let program = which::which(&name).map_err(|_| MorphError::ToolNotFound(name))?;
        Ok(Self {
            line: line.to_string(),
            program,
            args: tokens.collect(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Split a command line on whitespace with POSIX shell quoting rules.
///
/// Single quotes keep everything literally. Inside double quotes a backslash
/// only escapes `"`, `\`, `$` and `` ` ``; outside quotes it escapes any
/// character.
pub fn split_command(line: &str) -> MorphResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (None, '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| MorphError::config(format!("Trailing backslash in `{}`.", line)))?;
                current.push(escaped);
                in_token = true;
            }
            (Some(_), '\\') => match chars.peek().copied() {
                Some(next) if matches!(next, '"' | '\\' | '$' | '`') => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(MorphError::config(format!("Unterminated quote in `{}`.", line)));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn group_from_value(name: String, body: &Value) -> MorphResult<TestGroup> {
    let mapping = match body {
        Value::Mapping(m) => m,
        Value::Null => return TestGroup::new(name, Vec::new()),
        _ => {
            return Err(MorphError::config(format!(
                "Test group `{}` must be a mapping of lexical forms to surface forms.",
                name
            )))
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, forms) in mapping {
        let key = scalar_to_string(key).ok_or_else(|| {
            MorphError::config(format!("Non-scalar test key in group `{}`.", name))
        })?;
        let forms = forms_from_value(forms).ok_or_else(|| {
            MorphError::config(format!(
                "Test `{}` in group `{}` must be a string or a list of strings.",
                key, name
            ))
        })?;
        entries.push(TestEntry { key, forms });
    }

    TestGroup::new(name, entries)
}

fn forms_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items.iter().map(scalar_to_string).collect(),
        Value::Null => Some(Vec::new()),
        other => scalar_to_string(other).map(|s| vec![s]),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
