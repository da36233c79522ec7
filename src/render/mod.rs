//! Map surface abstraction and the view renderer that draws tracks on it

pub mod bounds;
pub mod surface;
pub mod visuals;
pub mod renderer;
pub mod memory;

pub use bounds::GeoBounds;
pub use surface::{MapSurface, PrimitiveId, PrimitiveStyle, Viewport};
pub use visuals::TrackVisuals;
pub use renderer::{TrackStyle, ViewRenderer};
pub use memory::{InMemorySurface, PrimitiveShape, StoredPrimitive};
