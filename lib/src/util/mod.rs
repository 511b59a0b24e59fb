pub mod bits;
pub mod file;
pub mod io;
