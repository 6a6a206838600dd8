// Detection layers, leaves first: raster access, geometry, then the three
// stages of a run (find, merge, order).

pub mod bounding_box;
pub mod box_merger;
pub mod box_orderer;
pub mod component_finder;
pub mod pixel;
pub mod utils;
