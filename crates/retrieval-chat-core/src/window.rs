//! Drag-to-move and click-to-zoom state for a floating panel
//!
//! Pure state machine; the front end translates its own mouse events into
//! [`PointerEvent`]s and reads back [`WindowChrome::offset`] and
//! [`WindowChrome::scale`] when laying the panel out.

const ZOOMED_SCALE: f32 = 1.5;

/// Which part of the panel a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    TitleBar,
    /// A button inside the title bar (zoom, clear, ...)
    TitleControl,
    Body,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { x: i32, y: i32, target: HitTarget },
    Move { x: i32, y: i32 },
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `anchor` is the grab point relative to the panel offset
    Dragging { anchor: (i32, i32) },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zoom {
    #[default]
    Normal,
    Zoomed,
}

#[derive(Debug, Clone, Default)]
pub struct WindowChrome {
    drag: DragState,
    offset: (i32, i32),
    zoom: Zoom,
}

impl WindowChrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y, target } => self.pointer_down(x, y, target),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    pub fn pointer_down(&mut self, x: i32, y: i32, target: HitTarget) {
        if target != HitTarget::TitleBar {
            return;
        }
        self.drag = DragState::Dragging {
            anchor: (x - self.offset.0, y - self.offset.1),
        };
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if let DragState::Dragging { anchor } = self.drag {
            self.offset = (x - anchor.0, y - anchor.1);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Keep the offset within `min..=max` on each axis.
    ///
    /// While dragging, the anchor moves by the amount clipped off so the
    /// panel follows the pointer again as soon as it heads back.
    pub fn clamp_offset(&mut self, min: (i32, i32), max: (i32, i32)) {
        let clamped = (
            self.offset.0.clamp(min.0, max.0.max(min.0)),
            self.offset.1.clamp(min.1, max.1.max(min.1)),
        );
        if let DragState::Dragging { anchor } = &mut self.drag {
            anchor.0 += self.offset.0 - clamped.0;
            anchor.1 += self.offset.1 - clamped.1;
        }
        self.offset = clamped;
    }

    pub fn toggle_zoom(&mut self) {
        self.zoom = match self.zoom {
            Zoom::Normal => Zoom::Zoomed,
            Zoom::Zoomed => Zoom::Normal,
        };
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom == Zoom::Zoomed
    }

    pub fn scale(&self) -> f32 {
        match self.zoom {
            Zoom::Normal => 1.0,
            Zoom::Zoomed => ZOOMED_SCALE,
        }
    }

    /// Size of a `width` x `height` panel at the current scale.
    pub fn scaled_size(&self, width: u16, height: u16) -> (u16, u16) {
        let scale = self.scale();
        let scaled = |v: u16| ((v as f32) * scale).round().min(u16::MAX as f32) as u16;
        (scaled(width), scaled(height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_moves_offset_by_pointer_delta() {
        let mut chrome = WindowChrome::new();
        chrome.handle(PointerEvent::Down { x: 10, y: 5, target: HitTarget::TitleBar });
        assert!(chrome.is_dragging());
        chrome.handle(PointerEvent::Move { x: 17, y: 3 });
        chrome.handle(PointerEvent::Up);

        assert_eq!(chrome.offset(), (7, -2));
        assert_eq!(chrome.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_successive_drags_accumulate() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(0, 0, HitTarget::TitleBar);
        chrome.pointer_move(4, 4);
        chrome.pointer_up();

        chrome.pointer_down(20, 1, HitTarget::TitleBar);
        chrome.pointer_move(15, 3);
        chrome.pointer_move(25, 6);
        chrome.pointer_up();

        assert_eq!(chrome.offset(), (9, 9));
    }

    #[test]
    fn test_title_control_does_not_start_drag() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(3, 0, HitTarget::TitleControl);
        assert!(!chrome.is_dragging());
        chrome.pointer_move(30, 10);
        assert_eq!(chrome.offset(), (0, 0));
    }

    #[test]
    fn test_body_and_outside_do_not_start_drag() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(3, 4, HitTarget::Body);
        chrome.pointer_down(3, 4, HitTarget::Outside);
        assert!(!chrome.is_dragging());
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_move(8, 8);
        chrome.pointer_up();
        assert_eq!(chrome.offset(), (0, 0));
    }

    #[test]
    fn test_zoom_toggle_round_trip() {
        let mut chrome = WindowChrome::new();
        assert_eq!(chrome.scale(), 1.0);
        chrome.toggle_zoom();
        assert_eq!(chrome.scale(), 1.5);
        assert!(chrome.is_zoomed());
        chrome.toggle_zoom();
        assert_eq!(chrome.scale(), 1.0);
    }

    #[test]
    fn test_zoom_is_independent_of_drag() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(0, 0, HitTarget::TitleBar);
        chrome.toggle_zoom();
        assert!(chrome.is_dragging());
        chrome.pointer_move(2, 2);
        chrome.pointer_up();
        assert_eq!(chrome.offset(), (2, 2));
        assert!(chrome.is_zoomed());
    }

    #[test]
    fn test_clamp_offset_shifts_anchor_while_dragging() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(30, 6, HitTarget::TitleBar);
        chrome.pointer_move(99, 6);
        chrome.clamp_offset((-20, -6), (20, 6));
        assert_eq!(chrome.offset(), (20, 0));

        // Heading back moves the panel immediately
        chrome.pointer_move(89, 6);
        chrome.clamp_offset((-20, -6), (20, 6));
        assert_eq!(chrome.offset(), (10, 0));
    }

    #[test]
    fn test_clamp_offset_within_bounds_is_noop() {
        let mut chrome = WindowChrome::new();
        chrome.pointer_down(0, 0, HitTarget::TitleBar);
        chrome.pointer_move(3, -2);
        chrome.clamp_offset((-20, -6), (20, 6));
        assert_eq!(chrome.offset(), (3, -2));
        assert_eq!(chrome.drag_state(), DragState::Dragging { anchor: (0, 0) });
    }

    #[test]
    fn test_scaled_size() {
        let mut chrome = WindowChrome::new();
        assert_eq!(chrome.scaled_size(60, 20), (60, 20));
        chrome.toggle_zoom();
        assert_eq!(chrome.scaled_size(60, 20), (90, 30));
    }
}
