pub mod batch;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
