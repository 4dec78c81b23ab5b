//! Floating widget position manager
//!
//! Keeps the widget's top-left corner inside the viewport with an 8px margin,
//! tracks pointer drags as an explicit Idle/Dragging state, snaps to corners
//! and persists every position change.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    state::position::{Corner, DragState, Viewport, WidgetPosition, WidgetSize},
    storage::{load_json, save_json, KeyValueStore, WIDGET_POSITION_KEY},
};

/// Minimum distance between the widget and any viewport edge
pub const EDGE_MARGIN: f64 = 8.0;
/// Distance from the edges when snapped to a corner
pub const CORNER_PADDING: f64 = 16.0;

/// Nearest position that keeps a `size` box inside `viewport`
pub fn clamp_position(x: f64, y: f64, viewport: Viewport, size: WidgetSize) -> WidgetPosition {
    let max_x = (viewport.width - size.width - EDGE_MARGIN).max(EDGE_MARGIN);
    let max_y = (viewport.height - size.height - EDGE_MARGIN).max(EDGE_MARGIN);
    // NaN from a bad pointer event falls back to the margin
    let x = if x.is_nan() { EDGE_MARGIN } else { x };
    let y = if y.is_nan() { EDGE_MARGIN } else { y };
    WidgetPosition::new(x.clamp(EDGE_MARGIN, max_x), y.clamp(EDGE_MARGIN, max_y))
}

/// Unclamped top-left position for a corner
pub fn corner_position(corner: Corner, viewport: Viewport, size: WidgetSize) -> WidgetPosition {
    let left = CORNER_PADDING;
    let top = CORNER_PADDING;
    let right = viewport.width - size.width - CORNER_PADDING;
    let bottom = viewport.height - size.height - CORNER_PADDING;
    match corner {
        Corner::TopLeft => WidgetPosition::new(left, top),
        Corner::TopRight => WidgetPosition::new(right, top),
        Corner::BottomLeft => WidgetPosition::new(left, bottom),
        Corner::BottomRight => WidgetPosition::new(right, bottom),
    }
}

pub struct PositionManager {
    position: WidgetPosition,
    viewport: Viewport,
    size: WidgetSize,
    drag: DragState,
    store: Arc<dyn KeyValueStore>,
}

impl PositionManager {
    /// Read the stored position, defaulting to the bottom-left corner
    pub fn load(store: Arc<dyn KeyValueStore>, viewport: Viewport, size: WidgetSize) -> Self {
        let stored = match load_json::<WidgetPosition>(store.as_ref(), WIDGET_POSITION_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring unreadable widget position: {}", e);
                None
            }
        };
        let initial = stored.unwrap_or_else(|| corner_position(Corner::BottomLeft, viewport, size));

        Self {
            position: clamp_position(initial.x, initial.y, viewport, size),
            viewport,
            size,
            drag: DragState::Idle,
            store,
        }
    }

    pub fn position(&self) -> WidgetPosition {
        self.position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn size(&self) -> WidgetSize {
        self.size
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn clamp(&self, x: f64, y: f64) -> WidgetPosition {
        clamp_position(x, y, self.viewport, self.size)
    }

    fn move_to(&mut self, x: f64, y: f64) -> WidgetPosition {
        let next = self.clamp(x, y);
        if next != self.position {
            self.position = next;
            if let Err(e) = save_json(self.store.as_ref(), WIDGET_POSITION_KEY, &self.position) {
                warn!("Failed to persist widget position: {}", e);
            }
        }
        self.position
    }

    /// Remember where on the widget the pointer grabbed it
    pub fn begin_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        self.drag = DragState::Dragging {
            offset_x: pointer_x - self.position.x,
            offset_y: pointer_y - self.position.y,
        };
        debug!("Widget drag started at ({}, {})", pointer_x, pointer_y);
    }

    /// Follow the pointer; ignored unless a drag is active
    pub fn drag_to(&mut self, pointer_x: f64, pointer_y: f64) -> WidgetPosition {
        match self.drag {
            DragState::Dragging { offset_x, offset_y } => {
                self.move_to(pointer_x - offset_x, pointer_y - offset_y)
            }
            DragState::Idle => self.position,
        }
    }

    pub fn end_drag(&mut self) {
        if self.drag.is_dragging() {
            debug!("Widget drag ended at ({}, {})", self.position.x, self.position.y);
        }
        self.drag = DragState::Idle;
    }

    pub fn snap_to_corner(&mut self, corner: Corner) -> WidgetPosition {
        let target = corner_position(corner, self.viewport, self.size);
        self.move_to(target.x, target.y)
    }

    /// Re-clamp after the viewport changed size
    pub fn resize_viewport(&mut self, viewport: Viewport) -> WidgetPosition {
        self.viewport = viewport;
        self.move_to(self.position.x, self.position.y)
    }

    /// Re-clamp after the widget was measured again
    pub fn set_widget_size(&mut self, size: WidgetSize) -> WidgetPosition {
        self.size = size;
        self.move_to(self.position.x, self.position.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };
    const SIZE: WidgetSize = WidgetSize {
        width: 240.0,
        height: 96.0,
    };

    fn manager() -> (PositionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (PositionManager::load(store.clone(), VIEWPORT, SIZE), store)
    }

    #[test]
    fn test_default_is_bottom_left() {
        let (manager, _) = manager();
        assert_eq!(manager.position(), WidgetPosition::new(16.0, 800.0 - 96.0 - 16.0));
        assert_eq!(manager.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_clamp_keeps_margin() {
        let (manager, _) = manager();
        assert_eq!(manager.clamp(-50.0, -50.0), WidgetPosition::new(8.0, 8.0));
        assert_eq!(
            manager.clamp(5000.0, 5000.0),
            WidgetPosition::new(1280.0 - 240.0 - 8.0, 800.0 - 96.0 - 8.0)
        );
        assert_eq!(manager.clamp(300.0, 200.0), WidgetPosition::new(300.0, 200.0));
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let viewports = [(1280.0, 800.0), (320.0, 480.0), (100.0, 50.0), (0.0, 0.0)];
        let sizes = [(240.0, 96.0), (400.0, 600.0), (0.0, 0.0)];
        let points = [-1e6, -8.0, 0.0, 7.9, 8.0, 123.4, 999.0, 1e6, f64::NAN];

        for (vw, vh) in viewports {
            for (sw, sh) in sizes {
                let viewport = Viewport { width: vw, height: vh };
                let size = WidgetSize { width: sw, height: sh };
                for x in points {
                    for y in points {
                        let once = clamp_position(x, y, viewport, size);
                        let twice = clamp_position(once.x, once.y, viewport, size);
                        assert_eq!(once, twice, "viewport {:?} size {:?} point ({}, {})", viewport, size, x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_drag_follows_pointer_with_offset() {
        let (mut manager, _) = manager();
        manager.snap_to_corner(Corner::TopLeft);
        manager.begin_drag(30.0, 26.0);
        assert!(manager.drag_state().is_dragging());

        assert_eq!(manager.drag_to(514.0, 310.0), WidgetPosition::new(500.0, 300.0));
        // Dragging past the edge clamps
        assert_eq!(manager.drag_to(-100.0, 310.0), WidgetPosition::new(8.0, 300.0));

        manager.end_drag();
        assert_eq!(manager.drag_state(), DragState::Idle);
        assert_eq!(manager.drag_to(700.0, 700.0), WidgetPosition::new(8.0, 300.0));
    }

    #[test]
    fn test_snap_to_each_corner() {
        let (mut manager, _) = manager();
        assert_eq!(manager.snap_to_corner(Corner::TopLeft), WidgetPosition::new(16.0, 16.0));
        assert_eq!(manager.snap_to_corner(Corner::TopRight), WidgetPosition::new(1024.0, 16.0));
        assert_eq!(manager.snap_to_corner(Corner::BottomLeft), WidgetPosition::new(16.0, 688.0));
        assert_eq!(manager.snap_to_corner(Corner::BottomRight), WidgetPosition::new(1024.0, 688.0));
    }

    #[test]
    fn test_snap_in_tiny_viewport_stays_clamped() {
        let store = Arc::new(MemoryStore::new());
        let viewport = Viewport { width: 200.0, height: 80.0 };
        let mut manager = PositionManager::load(store, viewport, SIZE);
        assert_eq!(manager.snap_to_corner(Corner::BottomRight), WidgetPosition::new(8.0, 8.0));
    }

    #[test]
    fn test_resize_reclamps_and_persists() {
        let (mut manager, store) = manager();
        manager.snap_to_corner(Corner::BottomRight);

        let moved = manager.resize_viewport(Viewport { width: 800.0, height: 600.0 });
        assert_eq!(moved, WidgetPosition::new(800.0 - 240.0 - 8.0, 600.0 - 96.0 - 8.0));

        let reloaded = PositionManager::load(store, manager.viewport(), manager.size());
        assert_eq!(reloaded.position(), moved);
    }

    #[test]
    fn test_stored_position_is_clamped_on_load() {
        let store = Arc::new(MemoryStore::new());
        save_json(store.as_ref(), WIDGET_POSITION_KEY, &WidgetPosition::new(4000.0, 10.0)).unwrap();
        let manager = PositionManager::load(store, VIEWPORT, SIZE);
        assert_eq!(manager.position(), WidgetPosition::new(1032.0, 10.0));
    }

    #[test]
    fn test_widget_size_change_reclamps() {
        let (mut manager, _) = manager();
        manager.snap_to_corner(Corner::BottomRight);
        let moved = manager.set_widget_size(WidgetSize { width: 400.0, height: 200.0 });
        assert_eq!(moved, WidgetPosition::new(1280.0 - 400.0 - 8.0, 800.0 - 200.0 - 8.0));
    }
}
