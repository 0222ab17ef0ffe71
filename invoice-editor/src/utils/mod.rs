pub mod gstin;
pub mod number;
