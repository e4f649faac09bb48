// Shared decoding and stream helpers
pub mod encoding;
pub mod io;
