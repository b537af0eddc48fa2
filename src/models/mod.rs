//! Wire models (camelCase JSON)

pub mod decision;
pub mod policy;
pub mod risk;
pub mod router;

pub use decision::*;
pub use policy::*;
pub use risk::*;
pub use router::*;
