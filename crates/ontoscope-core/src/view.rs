//! Materialized view over a knowledge base
//!
//! A [`GraphView`] holds the part of the knowledge base the user has chosen to
//! see. Its vertex and edge sets are always exactly what the materialization
//! rule derives from the expanded set, the pinned set and the selection:
//!
//! - every expanded entity, with its direct children (subclasses and
//!   instances for a class; types and object-property targets for an
//!   individual)
//! - every pinned entity
//! - the selected entity, plus its direct children when it was not already
//!   visible at the time it was highlighted
//!
//! Because every expanded entity contributes its own children, a branch that
//! was expanded under an ancestor stays materialized when the ancestor is
//! expanded again after a rebuild.
//!
//! Expanding is a union and is applied incrementally. Every removal
//! (collapse, unpin, selection change) re-derives the whole view, since an
//! entity may be reachable through more than one expanded ancestor.

use crate::entity::{EntityKind, EntityRef};
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::relation::Relationship;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The highlighted entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub entity: EntityRef,

    /// Whether the selection also materializes its own direct children
    pub with_neighbors: bool,
}

/// Result of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Expanded,
    Collapsed,
}

/// Serializable view state, enough to rebuild the full view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub expanded: Vec<EntityRef>,
    #[serde(default)]
    pub pinned: Vec<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// Vertex and edge sets produced by the materialization rule
#[derive(Debug, Default)]
struct Materialized {
    vertices: HashSet<EntityRef>,
    edges: HashSet<Relationship>,
}

impl Materialized {
    fn add_vertex(&mut self, entity: &EntityRef) {
        if !self.vertices.contains(entity) {
            self.vertices.insert(entity.clone());
        }
    }

    fn add_edge(&mut self, edge: Relationship) {
        self.add_vertex(&edge.source);
        self.add_vertex(&edge.target);
        self.edges.insert(edge);
    }

    /// One hop of the materialization rule for `entity`
    fn add_children(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<()> {
        self.add_vertex(entity);
        match entity.kind {
            EntityKind::Class => {
                for sub in kb.direct_subclasses(entity)? {
                    if sub.id.is_builtin_class() {
                        continue;
                    }
                    self.add_edge(Relationship::sub_class_of(sub, entity.clone()));
                }
                for individual in kb.direct_instances(entity)? {
                    self.add_edge(Relationship::instance_of(individual, entity.clone()));
                }
            }
            EntityKind::Individual => {
                for class in kb.types_of(entity)? {
                    self.add_edge(Relationship::type_of(entity.clone(), class));
                }
                for assertion in kb.object_property_assertions(entity)? {
                    let property = assertion.property.short_name.clone();
                    self.add_edge(Relationship::object_property(
                        entity.clone(),
                        assertion.target,
                        property,
                    ));
                }
            }
            EntityKind::ObjectProperty => {}
        }
        Ok(())
    }

    fn derive(
        kb: &dyn KnowledgeBase,
        expanded: &HashSet<EntityRef>,
        pinned: &HashSet<EntityRef>,
        selection: Option<&Selection>,
    ) -> Result<Self> {
        let mut out = Self::default();
        for entity in expanded {
            out.add_children(kb, entity)?;
        }
        for entity in pinned {
            out.add_vertex(entity);
        }
        if let Some(selection) = selection {
            if selection.with_neighbors {
                out.add_children(kb, &selection.entity)?;
            } else {
                out.add_vertex(&selection.entity);
            }
        }
        Ok(out)
    }
}

/// Partial, mutable view of the knowledge base.
///
/// Single-writer: all mutation happens through `&mut self` on the task that
/// owns the view. Every operation computes its new state before touching
/// `self`, so a failing knowledge base leaves the view unchanged.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    vertices: HashSet<EntityRef>,
    edges: HashSet<Relationship>,
    expanded: HashSet<EntityRef>,
    pinned: HashSet<EntityRef>,
    selection: Option<Selection>,
}

impl GraphView {
    /// Empty view
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial view: every root class expanded, every object property pinned
    pub fn seed(kb: &dyn KnowledgeBase) -> Result<Self> {
        let expanded: HashSet<EntityRef> = kb
            .root_classes()?
            .into_iter()
            .filter(|c| !c.id.is_builtin_class())
            .collect();
        let pinned: HashSet<EntityRef> = kb.all_object_properties()?.into_iter().collect();

        let mut view = Self {
            expanded,
            pinned,
            ..Self::default()
        };
        view.recompute(kb)?;

        tracing::debug!(
            "Seeded view: {} roots, {} vertices, {} edges",
            view.expanded.len(),
            view.vertices.len(),
            view.edges.len()
        );
        Ok(view)
    }

    /// Rebuild a view from saved state
    pub fn restore(kb: &dyn KnowledgeBase, state: ViewState) -> Result<Self> {
        let mut view = Self {
            expanded: state.expanded.into_iter().collect(),
            pinned: state.pinned.into_iter().collect(),
            selection: state.selection,
            ..Self::default()
        };
        view.recompute(kb)?;
        Ok(view)
    }

    /// Discard all state and seed again
    pub fn refresh(&mut self, kb: &dyn KnowledgeBase) -> Result<()> {
        *self = Self::seed(kb)?;
        Ok(())
    }

    /// Saved form of this view
    pub fn state(&self) -> ViewState {
        let mut expanded: Vec<EntityRef> = self.expanded.iter().cloned().collect();
        expanded.sort_by(|a, b| a.id.cmp(&b.id));
        let mut pinned: Vec<EntityRef> = self.pinned.iter().cloned().collect();
        pinned.sort_by(|a, b| a.id.cmp(&b.id));
        ViewState {
            expanded,
            pinned,
            selection: self.selection.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────────

    /// Materialize the direct children of `entity`.
    ///
    /// Returns `false` if the entity was already expanded.
    pub fn expand(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<bool> {
        if self.expanded.contains(entity) {
            return Ok(false);
        }

        let mut added = Materialized::default();
        added.add_children(kb, entity)?;

        tracing::debug!(
            "Expanded {} ({}): {} vertices, {} edges materialized",
            entity,
            entity.kind,
            added.vertices.len(),
            added.edges.len()
        );

        self.expanded.insert(entity.clone());
        self.vertices.extend(added.vertices);
        self.edges.extend(added.edges);
        Ok(true)
    }

    /// Remove `entity` from the expanded set and re-derive the view.
    ///
    /// Returns `false` (and changes nothing) if the entity was not expanded.
    pub fn collapse(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<bool> {
        if !self.expanded.contains(entity) {
            return Ok(false);
        }

        let mut expanded = self.expanded.clone();
        expanded.remove(entity);
        let derived = Materialized::derive(kb, &expanded, &self.pinned, self.selection.as_ref())?;

        tracing::debug!(
            "Collapsed {}: {} -> {} vertices",
            entity,
            self.vertices.len(),
            derived.vertices.len()
        );

        self.expanded = expanded;
        self.commit(derived);
        Ok(true)
    }

    /// Expand if not expanded, otherwise collapse
    pub fn toggle(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<Toggled> {
        if self.expanded.contains(entity) {
            self.collapse(kb, entity)?;
            Ok(Toggled::Collapsed)
        } else {
            self.expand(kb, entity)?;
            Ok(Toggled::Expanded)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection and pins
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `entity` the single selected entity.
    ///
    /// An entity that is not visible without a selection is shown together
    /// with its direct children. The previous selection's contribution is
    /// dropped, but nothing reachable by other means is removed.
    pub fn highlight(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<()> {
        if self.selected() == Some(entity) {
            return Ok(());
        }

        let base = Materialized::derive(kb, &self.expanded, &self.pinned, None)?;
        let selection = Selection {
            entity: entity.clone(),
            with_neighbors: !base.vertices.contains(entity),
        };
        let derived = Materialized::derive(kb, &self.expanded, &self.pinned, Some(&selection))?;

        tracing::debug!(
            "Highlighted {} ({}), neighbors materialized: {}",
            entity,
            entity.kind,
            selection.with_neighbors
        );

        self.selection = Some(selection);
        self.commit(derived);
        Ok(())
    }

    /// Drop the selection and re-derive the view
    pub fn clear_selection(&mut self, kb: &dyn KnowledgeBase) -> Result<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        let derived = Materialized::derive(kb, &self.expanded, &self.pinned, None)?;
        self.selection = None;
        self.commit(derived);
        Ok(())
    }

    /// Keep `entity` visible without expanding it
    pub fn pin(&mut self, entity: &EntityRef) -> bool {
        if !self.pinned.insert(entity.clone()) {
            return false;
        }
        self.vertices.insert(entity.clone());
        true
    }

    /// Remove a pin and re-derive the view
    pub fn unpin(&mut self, kb: &dyn KnowledgeBase, entity: &EntityRef) -> Result<bool> {
        if !self.pinned.contains(entity) {
            return Ok(false);
        }
        let mut pinned = self.pinned.clone();
        pinned.remove(entity);
        let derived = Materialized::derive(kb, &self.expanded, &pinned, self.selection.as_ref())?;
        self.pinned = pinned;
        self.commit(derived);
        Ok(true)
    }

    /// Remove every pin and re-derive the view
    pub fn clear_pins(&mut self, kb: &dyn KnowledgeBase) -> Result<()> {
        if self.pinned.is_empty() {
            return Ok(());
        }
        let pinned = HashSet::new();
        let derived = Materialized::derive(kb, &self.expanded, &pinned, self.selection.as_ref())?;
        self.pinned = pinned;
        self.commit(derived);
        Ok(())
    }

    /// Re-derive vertices and edges from the current expanded/pinned/selection state
    pub fn recompute(&mut self, kb: &dyn KnowledgeBase) -> Result<()> {
        let derived =
            Materialized::derive(kb, &self.expanded, &self.pinned, self.selection.as_ref())?;
        self.commit(derived);
        Ok(())
    }

    fn commit(&mut self, derived: Materialized) {
        self.vertices = derived.vertices;
        self.edges = derived.edges;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn vertices(&self) -> &HashSet<EntityRef> {
        &self.vertices
    }

    pub fn edges(&self) -> &HashSet<Relationship> {
        &self.edges
    }

    pub fn expanded(&self) -> &HashSet<EntityRef> {
        &self.expanded
    }

    pub fn pinned(&self) -> &HashSet<EntityRef> {
        &self.pinned
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<&EntityRef> {
        self.selection.as_ref().map(|s| &s.entity)
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.vertices.contains(entity)
    }

    pub fn is_expanded(&self, entity: &EntityRef) -> bool {
        self.expanded.contains(entity)
    }

    /// Visible entity with the given short name, ignoring case
    pub fn find_vertex(&self, name: &str) -> Option<&EntityRef> {
        let mut candidates: Vec<&EntityRef> =
            self.vertices.iter().filter(|v| v.name_matches(name)).collect();
        candidates.sort_by_key(|v| crate::lookup::RESOLUTION_ORDER.iter().position(|k| *k == v.kind));
        candidates.into_iter().next()
    }

    /// Sorted, serializable picture of the view for a rendering layer
    pub fn snapshot(&self, kb: &dyn KnowledgeBase) -> Result<ViewSnapshot> {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for entity in &self.vertices {
            vertices.push(VertexView {
                id: entity.id.to_string(),
                name: entity.short_name.clone(),
                kind: entity.kind,
                expanded: self.expanded.contains(entity),
                pinned: self.pinned.contains(entity),
                selected: self.selected() == Some(entity),
                expandable: kb.has_children(entity)?,
            });
        }
        vertices.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

        let mut edges: Vec<EdgeView> = self
            .edges
            .iter()
            .map(|e| EdgeView {
                source: e.source.short_name.clone(),
                target: e.target.short_name.clone(),
                label: e.kind.label().to_string(),
            })
            .collect();
        edges.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.target.cmp(&b.target))
        });

        Ok(ViewSnapshot {
            vertices,
            edges,
            selected: self.selected().map(|e| e.short_name.clone()),
        })
    }
}

/// Vertex as presented to a rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexView {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub expanded: bool,
    pub pinned: bool,
    pub selected: bool,
    pub expandable: bool,
}

/// Edge as presented to a rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Everything a rendering layer needs to draw the view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub vertices: Vec<VertexView>,
    pub edges: Vec<EdgeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}
