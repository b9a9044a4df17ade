pub mod generator;
pub mod profiles;
pub mod ratio;

pub use generator::PathGenerator;
pub use profiles::ProfileTable;
pub use ratio::combine_ratio;
