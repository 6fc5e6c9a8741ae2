pub mod deadlines;
pub mod due;
pub mod plan;
pub mod review;
pub mod stats;
pub mod term_config;
pub mod terms;
