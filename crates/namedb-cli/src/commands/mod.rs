pub mod list;
pub mod load;
pub mod name;
pub mod rand;
