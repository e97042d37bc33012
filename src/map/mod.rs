mod geometry;
mod projection;
mod renderer;

pub use projection::{Bounds, FitProjection};
pub use renderer::{District, DistrictLayer, DistrictMap, MapLayers};
