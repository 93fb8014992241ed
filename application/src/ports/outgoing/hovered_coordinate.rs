use domain::coords::Anchor;

/// Best-effort source of "where is the pointer on the canvas". Nothing in the
/// compositing path depends on it.
pub trait HoveredCoordinatePort {
    fn try_get_hovered_coordinate(&self) -> Option<Anchor>;
}
