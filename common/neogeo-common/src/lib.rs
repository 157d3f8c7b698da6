pub mod boxedarray;
pub mod frontend;
pub mod num;
