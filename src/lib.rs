pub mod cli;
pub mod editor;
pub mod io;
pub mod model;
pub mod ops;
pub mod preview;
pub mod tui;
pub mod util;
