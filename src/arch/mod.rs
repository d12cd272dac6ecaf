//! # Architecture Abstraction Layer
//!
//! Hardware boundary for the controller core the scheduler runs on.
//! Currently implements the Cortex-M4 port; extensible to other
//! controller cores by adding sibling modules. (Not to be confused
//! with [`crate::program::Architecture`], which describes the managed
//! compute nodes, not the controller.)

pub mod cortex_m4;
