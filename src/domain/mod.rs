// Domain layer - Core types, no I/O
pub mod chart;
pub mod dashboard;
pub mod page;
pub mod pair;
pub mod rate;
