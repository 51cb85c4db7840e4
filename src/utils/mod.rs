pub mod distance;
pub mod heatmap;
pub mod input;
pub mod output;
pub mod walk_graph;
