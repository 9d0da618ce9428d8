mod project;
mod properties;
