//! Actions: static definitions, effects, targeting, and input selections.
mod catalog;
mod definition;
mod effect;
mod selection;
mod targeting;

pub use catalog::{ActionCatalog, CatalogBuilder, CatalogError};
pub use definition::{
    ActionCost, ActionDefinition, ActionId, EffectId, TargetAudience, TargetShape,
};
pub use effect::{ActionEffect, EffectCapabilities, strike_damage};
pub use selection::{LegalAction, Selection};
pub use targeting::{TargetResolver, TargetingError};
