pub mod arena;
pub mod config;
pub mod edge;
pub mod error;
pub mod merge;
pub mod policy;
pub mod polygon;
pub mod seed;
pub mod subdivide;
pub mod tessellation;
pub mod triangle;
pub mod vector;
pub mod vertex;

pub use config::BuildConfig;
pub use error::{CoreError, CoreResult};
pub use policy::Policy;
pub use seed::{PlatonicSolid, SeedSolid};
pub use tessellation::Tessellation;
pub use vector::Vec3;
