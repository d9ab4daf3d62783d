pub mod branch_bound;
pub mod canonical;
pub mod config;
pub mod cutting_plane;
pub mod error;
pub mod knapsack;
pub mod linalg;
pub mod log;
pub mod revised_simplex;
pub mod sensitivity;
pub mod simplex;

pub use branch_bound::{BranchBoundNode, BranchBoundResult, NodeStatus};
pub use cutting_plane::{CuttingPlaneIteration, CuttingPlaneResult};
pub use knapsack::{KnapsackNode, KnapsackNodeStatus, KnapsackResult};
pub use sensitivity::{Range, SensitivityReport};
pub use canonical::{CanonicalModel, ColumnSource};
pub use config::SolverConfig;
pub use error::SolverError;
pub use log::{PriceOutEntry, ProductFormEntry, SimplexLog};
