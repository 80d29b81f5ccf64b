pub mod build;
pub mod liftover;
pub mod matched;
pub mod target;
pub mod variant;

// re-export for cleaner imports
pub use self::build::GenomeBuild;
pub use self::liftover::{LiftStatus, LiftoverRecord};
pub use self::matched::{MatchRecord, MatchType};
pub use self::target::TargetVariant;
pub use self::variant::{EffectType, ScoreVariant};
