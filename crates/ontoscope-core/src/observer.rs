//! Change notifications for a rendering layer

use crate::entity::EntityRef;
use crate::view::ViewSnapshot;

/// Receives the view after every committed change.
///
/// Called on the task that owns the view, never concurrently.
pub trait ViewObserver: Send {
    fn on_view_changed(&mut self, snapshot: &ViewSnapshot);

    /// Ask the renderer to scroll/center on an entity
    fn request_center_on(&mut self, _entity: &EntityRef) {}
}
