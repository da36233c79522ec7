use crate::core::DisplayMode;
use crate::render::PrimitiveId;
use std::collections::VecDeque;

/// Primitives owned by one track.
///
/// `markers[i]` belongs to `samples[i]`. Markers may lag behind the samples
/// (appends while hidden or in path mode); the renderer fills the gap from
/// the back before showing markers again.
#[derive(Debug, Default)]
pub struct TrackVisuals {
    pub(crate) markers: VecDeque<PrimitiveId>,
    pub(crate) path: Option<PrimitiveId>,
    pub(crate) mode: DisplayMode,
    pub(crate) shown: bool,
}

impl TrackVisuals {
    pub fn markers(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        self.markers.iter().copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn path(&self) -> Option<PrimitiveId> {
        self.path
    }

    /// Mode the track was last rendered in, or will be on activation
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}
