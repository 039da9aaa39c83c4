//! Autodetector for generating migrations from schema changes.
//!
//! This module compares a previous (frozen) schema state against the
//! current one and reports what was added, removed or changed for each
//! model. Diffs are computed over ordered maps, so the output follows
//! declaration order and is stable across runs.

use indexmap::IndexMap;
use serde_json::Value;

use crate::actions::{get_model_info, to_actions, Action, ModelInfo};
use crate::registry::ModelRegistry;
use crate::schema::{CompositeIndexSpec, Definition, PropertyDefinition, SchemaState};

/// Key excluded from change detection.
const DEFAULT_KEY: &str = "default";

/// Something that can be empty of changes.
pub trait ChangeSet {
    /// Returns true if nothing was added, removed or changed.
    fn is_null(&self) -> bool;
}

/// Result of [`dict_diff`].
#[derive(Debug, Clone, PartialEq)]
pub struct DictDiff<V> {
    /// Entries only in the current map, with current values.
    pub added: IndexMap<String, V>,
    /// Entries only in the previous map, with previous values.
    pub removed: IndexMap<String, V>,
    /// Entries in both maps whose values differ, as `(previous, current)`.
    pub changed: IndexMap<String, (V, V)>,
}

impl<V> ChangeSet for DictDiff<V> {
    fn is_null(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Diffs two maps by key.
///
/// `added` follows the order of `current`, `removed` the order of
/// `previous`. The `default` key never counts as changed.
pub fn dict_diff<V>(previous: &IndexMap<String, V>, current: &IndexMap<String, V>) -> DictDiff<V>
where
    V: Clone + PartialEq,
{
    let added = current
        .iter()
        .filter(|(k, _)| !previous.contains_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let removed = previous
        .iter()
        .filter(|(k, _)| !current.contains_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let changed = current
        .iter()
        .filter(|(k, _)| k.as_str() != DEFAULT_KEY)
        .filter_map(|(k, cur)| {
            let prev = previous.get(k.as_str())?;
            (prev != cur).then(|| (k.clone(), (prev.clone(), cur.clone())))
        })
        .collect();

    DictDiff {
        added,
        removed,
        changed,
    }
}

/// Change of a model's vertex label or edge type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChanges {
    /// Label to create.
    pub addition: Option<String>,
    /// Label to remove.
    pub deletion: Option<String>,
    /// Current label.
    pub current: String,
    /// The model diffed.
    pub model: ModelInfo,
}

impl LabelChanges {
    /// Label changes of a model that no longer exists.
    #[must_use]
    pub fn removal(previous: &SchemaState) -> Self {
        Self {
            addition: None,
            deletion: Some(previous.label.clone()),
            current: previous.label.clone(),
            model: get_model_info(previous),
        }
    }
}

impl ChangeSet for LabelChanges {
    fn is_null(&self) -> bool {
        self.addition.is_none() && self.deletion.is_none()
    }
}

/// Changes within one property definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionChanges {
    /// Definition keys only in the current property.
    pub added: Definition,
    /// Definition keys only in the previous property.
    pub removed: Definition,
    /// Definition keys whose value changed, as `(previous, current)`.
    pub changed: IndexMap<String, (Value, Value)>,
}

impl ChangeSet for DefinitionChanges {
    fn is_null(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Property changes of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChanges {
    /// Properties only in the current state.
    pub additions: IndexMap<String, PropertyDefinition>,
    /// Properties only in the previous state.
    pub deletions: IndexMap<String, PropertyDefinition>,
    /// Properties whose definition changed. A list so several revisions
    /// can be reported for one property.
    pub changes: IndexMap<String, Vec<DefinitionChanges>>,
    /// Properties of the current state.
    pub current: IndexMap<String, PropertyDefinition>,
    /// The model diffed.
    pub model: ModelInfo,
}

impl PropertyChanges {
    /// Property changes of a model that no longer exists.
    #[must_use]
    pub fn removal(previous: &SchemaState) -> Self {
        Self {
            additions: IndexMap::new(),
            deletions: previous.properties.clone(),
            changes: IndexMap::new(),
            current: IndexMap::new(),
            model: get_model_info(previous),
        }
    }
}

impl ChangeSet for PropertyChanges {
    fn is_null(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty() && self.changes.is_empty()
    }
}

/// Composite index changes of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexChanges {
    /// Indices only in the current state.
    pub additions: IndexMap<String, CompositeIndexSpec>,
    /// Indices only in the previous state.
    pub deletions: IndexMap<String, CompositeIndexSpec>,
    /// Indices whose spec changed, as `(previous, current)`.
    pub changes: IndexMap<String, (CompositeIndexSpec, CompositeIndexSpec)>,
    /// Indices of the current state.
    pub current: IndexMap<String, CompositeIndexSpec>,
    /// The model diffed.
    pub model: ModelInfo,
}

impl IndexChanges {
    /// Index changes of a model that no longer exists.
    #[must_use]
    pub fn removal(previous: &SchemaState) -> Self {
        Self {
            additions: IndexMap::new(),
            deletions: previous.composite_indices.clone(),
            changes: IndexMap::new(),
            current: IndexMap::new(),
            model: get_model_info(previous),
        }
    }
}

impl ChangeSet for IndexChanges {
    fn is_null(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty() && self.changes.is_empty()
    }
}

/// Compares the label of a model. A new model adds its label.
#[must_use]
pub fn diff_element_label(previous: Option<&SchemaState>, current: &SchemaState) -> LabelChanges {
    let (addition, deletion) = match previous {
        None => (Some(current.label.clone()), None),
        Some(prev) if prev.label != current.label => {
            (Some(current.label.clone()), Some(prev.label.clone()))
        }
        Some(_) => (None, None),
    };

    LabelChanges {
        addition,
        deletion,
        current: current.label.clone(),
        model: get_model_info(current),
    }
}

/// Compares two property definitions key by key, ignoring `default`.
#[must_use]
pub fn diff_definitions(previous: &Definition, current: &Definition) -> DefinitionChanges {
    let diff = dict_diff(previous, current);
    DefinitionChanges {
        added: diff.added,
        removed: diff.removed,
        changed: diff.changed,
    }
}

/// Compares the properties of a model.
///
/// Without a previous state every current property is an addition.
/// Properties present in both states are compared at definition level.
#[must_use]
pub fn diff_properties(previous: Option<&SchemaState>, current: &SchemaState) -> PropertyChanges {
    let model = get_model_info(current);
    let Some(previous) = previous else {
        return PropertyChanges {
            additions: current.properties.clone(),
            deletions: IndexMap::new(),
            changes: IndexMap::new(),
            current: current.properties.clone(),
            model,
        };
    };

    let previous_defs = definitions(&previous.properties);
    let current_defs = definitions(&current.properties);
    let diff = dict_diff(&previous_defs, &current_defs);

    let additions = diff
        .added
        .keys()
        .map(|name| (name.clone(), current.properties[name].clone()))
        .collect();
    let deletions = diff
        .removed
        .keys()
        .map(|name| (name.clone(), previous.properties[name].clone()))
        .collect();

    let changes = diff
        .changed
        .iter()
        .filter_map(|(name, (prev, cur))| {
            let nested = diff_definitions(prev, cur);
            (!nested.is_null()).then(|| (name.clone(), vec![nested]))
        })
        .collect();

    PropertyChanges {
        additions,
        deletions,
        changes,
        current: current.properties.clone(),
        model,
    }
}

fn definitions(properties: &IndexMap<String, PropertyDefinition>) -> IndexMap<String, Definition> {
    properties
        .iter()
        .map(|(name, prop)| (name.clone(), prop.definition()))
        .collect()
}

/// Compares the composite indices of a model by name.
#[must_use]
pub fn diff_composite_indices(
    previous: Option<&SchemaState>,
    current: &SchemaState,
) -> IndexChanges {
    let empty: IndexMap<String, CompositeIndexSpec> = IndexMap::new();
    let previous_indices = previous.map_or(&empty, |p| &p.composite_indices);
    let diff = dict_diff(previous_indices, &current.composite_indices);

    IndexChanges {
        additions: diff.added,
        deletions: diff.removed,
        changes: diff.changed,
        current: current.composite_indices.clone(),
        model: get_model_info(current),
    }
}

/// Options for the autodetector.
#[derive(Debug, Clone)]
pub struct AutodetectorOptions {
    /// Whether composite indices are diffed. When off, index changes are
    /// always empty and indices must be managed by hand.
    pub diff_composite_indices: bool,
}

impl Default for AutodetectorOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AutodetectorOptions {
    /// Creates default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diff_composite_indices: true,
        }
    }

    /// Disables composite index diffing.
    #[must_use]
    pub const fn without_index_diffing(mut self) -> Self {
        self.diff_composite_indices = false;
        self
    }
}

/// Detects schema changes and compiles them into actions.
#[derive(Debug, Default)]
pub struct Autodetector {
    options: AutodetectorOptions,
}

impl Autodetector {
    /// Creates a new autodetector with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new autodetector with custom options.
    #[must_use]
    pub const fn with_options(options: AutodetectorOptions) -> Self {
        Self { options }
    }

    /// Diffs one model and compiles the result into actions.
    #[must_use]
    pub fn diff_model(&self, previous: Option<&SchemaState>, current: &SchemaState) -> Vec<Action> {
        let label = diff_element_label(previous, current);
        let properties = diff_properties(previous, current);
        let indices = if self.options.diff_composite_indices {
            diff_composite_indices(previous, current)
        } else {
            IndexChanges {
                additions: IndexMap::new(),
                deletions: IndexMap::new(),
                changes: IndexMap::new(),
                current: current.composite_indices.clone(),
                model: get_model_info(current),
            }
        };
        to_actions(&label, &indices, &properties)
    }

    /// Compiles the removal of a model into actions.
    #[must_use]
    pub fn remove_model(&self, previous: &SchemaState) -> Vec<Action> {
        let indices = if self.options.diff_composite_indices {
            IndexChanges::removal(previous)
        } else {
            IndexChanges {
                deletions: IndexMap::new(),
                ..IndexChanges::removal(previous)
            }
        };
        to_actions(
            &LabelChanges::removal(previous),
            &indices,
            &PropertyChanges::removal(previous),
        )
    }

    /// Compares the previous models of `package` against the registry.
    ///
    /// Models are visited in registry order, then removed models in
    /// previous order.
    #[must_use]
    pub fn plan(
        &self,
        previous: &IndexMap<String, SchemaState>,
        current: &ModelRegistry,
        package: &str,
    ) -> Vec<Action> {
        let mut actions = Vec::new();

        for model in current.for_package(package) {
            actions.extend(self.diff_model(previous.get(&model.model_ref), model));
        }

        for (model_ref, model) in previous {
            if current.get(model_ref).is_none() {
                actions.extend(self.remove_model(model));
            }
        }

        actions
    }
}
