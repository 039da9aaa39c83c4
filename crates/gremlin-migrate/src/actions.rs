//! Migration actions.
//!
//! An [`Action`] is one detected schema change rendered both ways: the
//! forwards operation, the backwards operation, the code text of each, and a
//! one-line console summary. Delete actions are built by swapping the two
//! sides of the matching add action, so every delete is the exact inverse
//! of its add.

use tracing::warn;

use crate::autodetector::{IndexChanges, LabelChanges, PropertyChanges};
use crate::operations::SchemaOperation;
use crate::schema::{CompositeIndexSpec, ElementKind, PropertyDefinition, SchemaState};

const CODE_INDENT: &str = "        ";

/// Identity of the model an action applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Element kind.
    pub kind: ElementKind,
    /// Qualified model reference, `<package>.<Class>`.
    pub model_ref: String,
    /// Vertex label or edge type.
    pub label: String,
}

impl ModelInfo {
    /// Returns the class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.model_ref
            .rsplit_once('.')
            .map_or(self.model_ref.as_str(), |(_, class)| class)
    }

    /// Returns the package name.
    #[must_use]
    pub fn package(&self) -> &str {
        self.model_ref
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }
}

/// Returns the kind, model reference and label of a model.
#[must_use]
pub fn get_model_info(model: &SchemaState) -> ModelInfo {
    ModelInfo {
        kind: model.kind,
        model_ref: model.model_ref.clone(),
        label: model.label.clone(),
    }
}

/// What an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Add a vertex or edge label.
    AddElementType,
    /// Delete a vertex or edge label.
    DeleteElementType,
    /// Add a property key.
    AddProperty,
    /// Delete a property key.
    DeleteProperty,
    /// Add a composite index.
    AddCompositeIndex,
    /// Delete a composite index.
    DeleteCompositeIndex,
}

/// One schema change, renderable in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    model: ModelInfo,
    subject: String,
    forwards: SchemaOperation,
    backwards: SchemaOperation,
    forwards_comment: String,
    backwards_comment: String,
    prepend_forwards: bool,
    prepend_backwards: bool,
}

impl Action {
    /// Adds the model's vertex or edge label.
    #[must_use]
    pub fn add_element_type(model: &ModelInfo) -> Self {
        let (create, delete) = match model.kind {
            ElementKind::Vertex => (
                SchemaOperation::create_vertex_type(model.label.clone()),
                SchemaOperation::delete_vertex_type(model.label.clone()),
            ),
            ElementKind::Edge => (
                SchemaOperation::create_edge_type(model.label.clone()),
                SchemaOperation::delete_edge_type(model.label.clone()),
            ),
        };
        Self {
            kind: ActionKind::AddElementType,
            model: model.clone(),
            subject: model.label.clone(),
            forwards: create,
            backwards: delete,
            forwards_comment: format!("# Adding {} '{}'", model.kind, model.model_ref),
            backwards_comment: format!("# Deleting {} '{}'", model.kind, model.model_ref),
            prepend_forwards: false,
            prepend_backwards: false,
        }
    }

    /// Deletes the model's vertex or edge label.
    #[must_use]
    pub fn delete_element_type(model: &ModelInfo) -> Self {
        Self::add_element_type(model).reversed(ActionKind::DeleteElementType)
    }

    /// Adds a property key.
    ///
    /// Warns when the property is required, since existing elements are
    /// never backfilled by a schema migration.
    #[must_use]
    pub fn add_property(model: &ModelInfo, prop: &PropertyDefinition) -> Self {
        if prop.required && !prop.has_default() {
            warn!(
                model = %model.model_ref,
                property = %prop.name,
                "You've specified a property to be required but haven't specified a default \
                 value, you will need to manually change the database"
            );
        } else if prop.required {
            warn!(
                model = %model.model_ref,
                property = %prop.name,
                "Required property has a default, existing elements will not be backfilled"
            );
        }
        Self::property_templates(model, prop)
    }

    /// Deletes a property key.
    #[must_use]
    pub fn delete_property(model: &ModelInfo, prop: &PropertyDefinition) -> Self {
        Self::property_templates(model, prop).reversed(ActionKind::DeleteProperty)
    }

    fn property_templates(model: &ModelInfo, prop: &PropertyDefinition) -> Self {
        let db_field = prop.db_field_name();
        Self {
            kind: ActionKind::AddProperty,
            model: model.clone(),
            subject: prop.name.clone(),
            forwards: SchemaOperation::CreatePropertyKey {
                name: db_field.clone(),
                data_type: prop.data_type(),
                cardinality: prop.cardinality,
            },
            backwards: SchemaOperation::delete_property_key(db_field),
            forwards_comment: format!(
                "# Adding element property '{}.{}'",
                model.model_ref, prop.name
            ),
            backwards_comment: format!(
                "# Deleting element property '{}.{}'",
                model.model_ref, prop.name
            ),
            prepend_forwards: false,
            prepend_backwards: false,
        }
    }

    /// Adds a composite index.
    #[must_use]
    pub fn add_composite_index(model: &ModelInfo, name: &str, spec: &CompositeIndexSpec) -> Self {
        Self {
            kind: ActionKind::AddCompositeIndex,
            model: model.clone(),
            subject: name.to_string(),
            forwards: SchemaOperation::CreateCompositeIndex {
                index_key: name.to_string(),
                edge_key: None,
                element: model.kind,
                keys: spec.keys.clone(),
                unique: spec.unique,
                indexer: spec.indexer.clone(),
            },
            backwards: SchemaOperation::delete_composite_index(name),
            forwards_comment: format!(
                "# Adding composite index '{}' for '{}'",
                name, model.model_ref
            ),
            backwards_comment: format!(
                "# Removing composite index '{}' for '{}'",
                name, model.model_ref
            ),
            prepend_forwards: false,
            prepend_backwards: true,
        }
    }

    /// Deletes a composite index.
    #[must_use]
    pub fn delete_composite_index(model: &ModelInfo, name: &str, spec: &CompositeIndexSpec) -> Self {
        Self::add_composite_index(model, name, spec).reversed(ActionKind::DeleteCompositeIndex)
    }

    // Placement follows the operation: an index removal goes first in
    // either direction, an index build keeps its place after the keys.
    fn reversed(self, kind: ActionKind) -> Self {
        Self {
            kind,
            forwards: self.backwards,
            backwards: self.forwards,
            forwards_comment: self.backwards_comment,
            backwards_comment: self.forwards_comment,
            prepend_forwards: self.prepend_backwards,
            prepend_backwards: self.prepend_forwards,
            ..self
        }
    }

    /// Returns what the action does.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Returns the model the action applies to.
    #[must_use]
    pub const fn model(&self) -> &ModelInfo {
        &self.model
    }

    /// Returns the forwards operation.
    #[must_use]
    pub const fn forwards(&self) -> &SchemaOperation {
        &self.forwards
    }

    /// Returns the backwards operation.
    #[must_use]
    pub const fn backwards(&self) -> &SchemaOperation {
        &self.backwards
    }

    /// Returns true if the forwards side goes to the front of the list.
    #[must_use]
    pub const fn prepend_forwards(&self) -> bool {
        self.prepend_forwards
    }

    /// Returns true if the backwards side goes to the front of the list.
    #[must_use]
    pub const fn prepend_backwards(&self) -> bool {
        self.prepend_backwards
    }

    /// Renders the forwards code: a comment line and the operation call.
    #[must_use]
    pub fn forwards_code(&self) -> String {
        render_code(&self.forwards_comment, &self.forwards)
    }

    /// Renders the backwards code.
    #[must_use]
    pub fn backwards_code(&self) -> String {
        render_code(&self.backwards_comment, &self.backwards)
    }

    /// Places the forwards operation into `list`.
    pub fn add_forwards(&self, list: &mut Vec<SchemaOperation>) {
        place(list, self.forwards.clone(), self.prepend_forwards);
    }

    /// Places the backwards operation into `list`.
    pub fn add_backwards(&self, list: &mut Vec<SchemaOperation>) {
        place(list, self.backwards.clone(), self.prepend_backwards);
    }

    /// Places the forwards code into `list`.
    pub fn add_forwards_code(&self, list: &mut Vec<String>) {
        place(list, self.forwards_code(), self.prepend_forwards);
    }

    /// Places the backwards code into `list`.
    pub fn add_backwards_code(&self, list: &mut Vec<String>) {
        place(list, self.backwards_code(), self.prepend_backwards);
    }

    /// Returns a one-line summary for console output.
    #[must_use]
    pub fn console_line(&self) -> String {
        let class = self.model.class_name();
        let package = self.model.package();
        match self.kind {
            ActionKind::AddElementType => format!(
                " + Added element type '{}' for package '{}'",
                class, package
            ),
            ActionKind::DeleteElementType => format!(
                " - Deleted element type '{}' for package '{}'",
                class, package
            ),
            ActionKind::AddProperty => format!(
                " + Added element property '{}' to '{}' for package '{}'",
                self.subject, class, package
            ),
            ActionKind::DeleteProperty => format!(
                " - Deleted element property '{}' from '{}' for package '{}'",
                self.subject, class, package
            ),
            ActionKind::AddCompositeIndex => format!(
                " + Added composite index '{}' to '{}' for package '{}'",
                self.subject, class, package
            ),
            ActionKind::DeleteCompositeIndex => format!(
                " - Deleted composite index '{}' from '{}' for package '{}'",
                self.subject, class, package
            ),
        }
    }
}

fn render_code(comment: &str, op: &SchemaOperation) -> String {
    format!("{i}{}\n{i}{}\n", comment, op, i = CODE_INDENT)
}

fn place<T>(list: &mut Vec<T>, item: T, prepend: bool) {
    if prepend {
        list.insert(0, item);
    } else {
        list.push(item);
    }
}

/// Compiles the changes of one model into ordered actions.
///
/// The order is: label addition, property additions, index deletions,
/// index additions, property deletions, label deletion. A changed index is
/// deleted and re-added. Changed property definitions produce no action;
/// they are reported as warnings since they need a manual migration.
#[must_use]
pub fn to_actions(
    label: &LabelChanges,
    indices: &IndexChanges,
    properties: &PropertyChanges,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if label.addition.is_some() {
        actions.push(Action::add_element_type(&label.model));
    }

    for prop in properties.additions.values() {
        actions.push(Action::add_property(&properties.model, prop));
    }

    for (name, spec) in &indices.deletions {
        actions.push(Action::delete_composite_index(&indices.model, name, spec));
    }
    for (name, (previous, _)) in &indices.changes {
        actions.push(Action::delete_composite_index(&indices.model, name, previous));
    }
    for (name, (_, current)) in &indices.changes {
        actions.push(Action::add_composite_index(&indices.model, name, current));
    }
    for (name, spec) in &indices.additions {
        actions.push(Action::add_composite_index(&indices.model, name, spec));
    }

    for (name, changes) in &properties.changes {
        for change in changes {
            let keys: Vec<&str> = change.changed.keys().map(String::as_str).collect();
            warn!(
                model = %properties.model.model_ref,
                property = %name,
                changed = %keys.join(", "),
                "Property definition changed, existing property keys need a manual migration"
            );
        }
    }

    for prop in properties.deletions.values() {
        actions.push(Action::delete_property(&properties.model, prop));
    }

    if let Some(previous) = &label.deletion {
        let mut model = label.model.clone();
        model.label.clone_from(previous);
        actions.push(Action::delete_element_type(&model));
    }

    actions
}
