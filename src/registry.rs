//! Record templates by type key.
//!
//! A [`Registry`] maps [`TypeKey`]s to [`Template`]s and never fails to
//! produce a record: a key without a registered template is relaxed one
//! discriminator at a time, and past the kind alone a generic layout is used
//! which keeps every byte of a line.
//!
//! Every resolution returns an independent [`Record`], so records resolved
//! concurrently never share storage.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::{
    config::Config,
    field::{Field, FieldKind},
    key::TypeKey,
    line::{LayoutError, RecordLine},
    record::{Part, Record, Split},
    sans::rules,
};

pub mod builtin;

/// A prototype record layout.
#[derive(Debug, Clone, Default)]
pub struct Template {
    version: Arc<str>,
    lines: Vec<RecordLine>,
    splits: Vec<Split>,
}

impl Template {
    pub fn new(version: impl Into<Arc<str>>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// The layout used when no template is registered: the kind, the line
    /// sequence number, and every byte between them as text.
    pub fn generic() -> Self {
        Self {
            version: "".into(),
            lines: vec![Self::generic_line(1)],
            splits: vec![],
        }
    }

    /// A generic line with a sequence number.
    pub fn generic_line(seq: u8) -> RecordLine {
        RecordLine::from_sorted(
            TypeKey::UNKNOWN,
            seq,
            vec![
                Field::numeric("Satzart", 1, 4),
                Field::text("Daten", 5, 251),
                Field::char("Satznummer", rules::SEQUENCE),
            ],
        )
    }

    /// Build a template from rows of `(seq, name, kind, address, length)`.
    pub fn from_rows<'a>(
        version: impl Into<Arc<str>>,
        rows: impl IntoIterator<Item = (u8, &'a str, FieldKind, u16, u16)>,
    ) -> Result<Self, LayoutError> {
        let mut template = Self::new(version);

        for (seq, name, kind, address, length) in rows {
            template
                .line_entry(seq)
                .add(Field::new(name, kind, address, length))?;
        }

        Ok(template)
    }

    /// Add a line, replacing one with the same sequence number.
    pub fn with_line(mut self, line: RecordLine) -> Self {
        let seq = line.seq();
        *self.line_entry(seq) = line;
        self
    }

    /// Present a stored field as several fields.
    ///
    /// Every part must lie within the stored field.
    pub fn with_split(mut self, split: Split) -> Result<Self, LayoutError> {
        let width = self
            .lines
            .iter()
            .find_map(|line| line.field(&split.field).ok())
            .map_or(0, Field::len);

        let fits = |p: &&Part| u32::from(p.offset) + u32::from(p.length) <= u32::from(width);

        if let Some(part) = split.parts.iter().find(|p| !fits(p)) {
            Err(LayoutError::PartOutOfBounds {
                part: part.name.to_string(),
                field: split.field.to_string(),
            })?;
        }

        self.splits.push(split);
        Ok(self)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Lines in sequence order.
    pub fn lines(&self) -> &[RecordLine] {
        &self.lines
    }

    pub fn line(&self, seq: u8) -> Option<&RecordLine> {
        self.lines.iter().find(|l| l.seq() == seq)
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Sequence number of the last line.
    pub fn last_seq(&self) -> Option<u8> {
        self.lines.last().map(RecordLine::seq)
    }

    pub(crate) fn line_entry(&mut self, seq: u8) -> &mut RecordLine {
        let i = self.lines.partition_point(|l| l.seq() < seq);

        if self.lines.get(i).is_none_or(|l| l.seq() != seq) {
            self.lines.insert(i, RecordLine::new(TypeKey::UNKNOWN, seq));
        }

        &mut self.lines[i]
    }

    /// Copy the layout into a record of a key, writing the key's
    /// discriminators into every line.
    pub(crate) fn instantiate(
        &self,
        key: TypeKey,
        matched: Option<TypeKey>,
        config: Config,
    ) -> Record {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                let mut line = line.with_config(config);
                line.set_key(key);
                mark(&mut line, key);
                line
            })
            .collect();

        Record::new(
            key,
            matched,
            self.version.clone(),
            lines,
            self.splits.clone().into(),
        )
    }
}

/// Write the discriminators of a key into a line.
pub(crate) fn mark(line: &mut RecordLine, key: TypeKey) {
    if key == TypeKey::UNKNOWN {
        return;
    }

    line.write_bytes(*rules::KIND.start(), format!("{:04}", key.kind()).as_bytes());

    if let Some(branch) = key.branch() {
        line.write_bytes(*rules::BRANCH.start(), format!("{branch:03}").as_bytes());

        let rule = rules::find(key.kind(), branch);
        if let (Some(rule), Some(sub_branch)) = (rule, key.sub_branch()) {
            if let Some(b) = rule.byte(sub_branch) {
                line.write_bytes(rule.address, &[b]);
            }
        }
    }

    if line.seq() < 10 && line.field_at(rules::SEQUENCE).is_some() {
        line.write_bytes(rules::SEQUENCE, &[b'0' + line.seq()]);
    }
}

/// The result of a lookup.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// A fresh record of the requested key.
    pub record: Record,
    /// The key of the template used, or `None` for the generic layout.
    pub matched: Option<TypeKey>,
    /// The template used.
    pub template: Arc<Template>,
}

/// A shared, mutable mapping of type keys to templates.
///
/// Lookups take a read lock; registration takes a write lock, so readers
/// never observe a partial update.
#[derive(Debug)]
pub struct Registry {
    templates: RwLock<HashMap<TypeKey, Arc<Template>>>,
    builtins: bool,
    generic: Arc<Template>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry without any templates.
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
            builtins: false,
            generic: Arc::new(Template::generic()),
        }
    }

    /// Create a registry holding the built-in templates.
    ///
    /// [`Registry::reset`] restores this state.
    pub fn with_builtins() -> Self {
        Self {
            templates: RwLock::new(builtin::templates()),
            builtins: true,
            generic: Arc::new(Template::generic()),
        }
    }

    /// Store a template, replacing any under the same key.
    pub fn register(&self, key: TypeKey, template: Template) {
        debug!("Registering template for {key}.");
        self.templates.write().insert(key, Arc::new(template));
    }

    /// Remove the template under a key. Unknown keys are ignored.
    pub fn unregister(&self, key: TypeKey) -> bool {
        self.templates.write().remove(&key).is_some()
    }

    /// Discard runtime registrations, restoring the initial templates.
    pub fn reset(&self) {
        let baseline = if self.builtins {
            builtin::templates()
        } else {
            HashMap::new()
        };

        *self.templates.write() = baseline;
    }

    /// Whether a template is registered under exactly this key.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.templates.read().contains_key(&key)
    }

    /// Registered keys in ascending order.
    pub fn keys(&self) -> Vec<TypeKey> {
        let mut keys: Vec<_> = self.templates.read().keys().copied().collect();
        keys.sort();
        keys
    }

    /// Find the template for a key, and the key it is registered under.
    ///
    /// Each relaxation of the key is tried in turn, most specific first. A
    /// key without a line sequence also matches a registered variant of it
    /// with sequence 1, or failing that the only registered variant.
    pub fn find(&self, key: TypeKey) -> Option<(TypeKey, Arc<Template>)> {
        let templates = self.templates.read();

        key.relaxations().find_map(|k| {
            if let Some(template) = templates.get(&k) {
                return Some((k, template.clone()));
            }

            if k.sub_branch().is_none() || k.sequence().is_some() {
                return None;
            }

            let mut variants = templates
                .iter()
                .filter(|(v, _)| v.sequence().is_some() && v.without_sequence() == k);

            let first = variants.next()?;
            let rest: Vec<_> = variants.collect();

            if first.0.sequence() == Some(1) || rest.is_empty() {
                return Some((*first.0, first.1.clone()));
            }

            rest.into_iter()
                .find(|(v, _)| v.sequence() == Some(1))
                .map(|(v, t)| (*v, t.clone()))
        })
    }

    /// Produce a record for a key with a configuration.
    pub fn lookup(&self, key: TypeKey, config: Config) -> Resolution {
        let (matched, template) = match self.find(key) {
            Some((matched, template)) => (Some(matched), template),
            None => (None, self.generic.clone()),
        };

        debug!(
            "Resolved {key} to {}.",
            matched.map_or_else(|| "generic layout".to_owned(), |k| k.to_string())
        );

        Resolution {
            record: template.instantiate(key, matched, config),
            matched,
            template,
        }
    }

    /// Produce a record for a key.
    pub fn resolve(&self, key: TypeKey) -> Record {
        self.lookup(key, Config::default()).record
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_builtins);

/// The process-wide registry, holding the built-in templates until changed.
pub fn global() -> &'static Registry {
    &GLOBAL
}
