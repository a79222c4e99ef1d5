// Core draft engine: roster catalog, tier ranking, pick sequencing, session
// state, and the AI selection policy.

pub mod catalog;
pub mod draft;
pub mod error;
pub mod names;
pub mod store;
pub mod tiers;

pub use catalog::{Captain, Catalog, Player, Position};
pub use draft::captains::CaptainOrder;
pub use draft::pick::{DraftPick, PickOrigin, PickOutcome};
pub use draft::schedule::{DraftPattern, PickSlot};
pub use draft::state::{DraftPhase, DraftSession};
pub use draft::team::{Team, TeamSlot};
pub use error::{CatalogError, DraftError, TierError};
pub use names::NameOverrides;
pub use store::{MemoryStore, StateStore};
pub use tiers::{Tier, TierList};
