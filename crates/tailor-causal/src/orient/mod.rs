pub mod fci_rules;
pub mod gfci;
pub mod sepsets;

pub use fci_rules::FciOrient;
pub use gfci::{GfciResult, IsGfci};
pub use sepsets::{SepsetProducer, SepsetsGreedy};
