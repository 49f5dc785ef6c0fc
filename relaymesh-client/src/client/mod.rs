mod mesh_client;

pub use mesh_client::*;
