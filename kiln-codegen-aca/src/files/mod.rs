//! Rendered files of the Container Apps target.

mod container_app;

pub use container_app::ContainerAppTemplate;
