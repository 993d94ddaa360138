pub mod alphabet;
pub mod compress;
pub mod decompress;
pub mod profile;
