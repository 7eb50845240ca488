mod config;
mod diff;
mod field;
mod phase;
mod ruins;
mod sapling;
mod stabilizer;
mod terrain;
mod visibility;
mod world;

pub use config::*;
pub use diff::*;
pub use field::*;
pub use phase::*;
pub use ruins::*;
pub use sapling::*;
pub use stabilizer::*;
pub use terrain::*;
pub use visibility::*;
pub use world::*;
