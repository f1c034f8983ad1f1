pub mod svg;

pub use svg::SourceMeta;
