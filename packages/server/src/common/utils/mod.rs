pub mod content;
pub mod geocoding;

pub use content::*;
pub use geocoding::*;
