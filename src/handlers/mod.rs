pub mod schemas;
pub mod sections;
pub mod templates;
pub mod versions;
pub mod workspaces;
