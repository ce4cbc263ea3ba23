pub mod centrality;
pub mod graph;
pub mod layout;
pub mod metadata;
pub mod pipeline;
pub mod presence;
pub mod render;
pub mod script;
