pub mod cache;
pub mod counts;
pub mod instance;
pub mod population;
pub mod radix;
pub mod structure_prior;

pub use cache::{LocalScoreCache, ScoreKey};
pub use counts::CountTable;
pub use instance::IsScore;
pub use population::{bdeu_row_prior, bdeu_score, bic_score, LocalScore, PopulationScore, ScoreKind};
pub use structure_prior::{EditCounts, StructurePrior};
