//! Evolutionary processes acting between generations.
//!
//! - **Recombination**: breakpoint generators and the recombination setup for
//!   maternal and paternal gametes
//! - **Mating**: weighted choice of source populations for each offspring
//! - **Selection**: fitness-proportional choice of parent organisms

pub mod mating;
pub mod recombination;
pub mod recombination_map;
pub mod selection;

pub use mating::{MatingDistribution, MatingEntry, MAX_DRAW_ATTEMPTS};
pub use recombination::{
    ChromosomeGenerator, GeneratorConfig, PositionGenerator, RateOverride, RecombinationConfig,
    RecombinationModel,
};
pub use recombination_map::{MapRecord, RecombinationMap};
pub use selection::{IndexSampler, SamplerCache};
