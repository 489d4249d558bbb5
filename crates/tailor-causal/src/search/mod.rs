pub mod arrow;
pub mod fges;
pub mod subsets;

pub use arrow::{Arrow, ArrowQueue};
pub use fges::{EditKind, IsFges, Mode, SearchResult, SearchStep};
