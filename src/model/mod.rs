//! Artifact metadata model.
//!
//! Every stage of a compliance pipeline works on [`Artifact`] records:
//! analyzers create them, enrichers merge further facts into them,
//! validators read them and generators render them.
//!
//! ```ignore
//! use antenna::model::{
//!     Artifact, ArtifactFilename, Coordinate, DeclaredLicenseInformation, License,
//! };
//!
//! let mut artifact = Artifact::new("csv");
//! artifact
//!     .add_coordinate(Coordinate::of("mvn", "org.foo", "bar", "1.0"))
//!     .add_fact(ArtifactFilename::with_hash("bar-1.0.jar", "0a1b2c"))
//!     .add_fact(DeclaredLicenseInformation::new(License::known("MIT")));
//!
//! let declared = artifact.ask_for_get::<DeclaredLicenseInformation>();
//! ```

mod artifact;
mod coordinate;
mod facts;
mod license;
mod selector;

pub use artifact::*;
pub use coordinate::*;
pub use facts::*;
pub use license::*;
pub use selector::*;
