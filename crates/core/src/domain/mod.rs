pub mod product;
pub mod status;
