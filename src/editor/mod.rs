pub mod drag;
pub mod edit;
pub mod focus;
pub mod keyboard;
pub mod session;

pub use drag::{Bounds, DragController, PointerModifiers, TouchHit};
pub use focus::{FocusController, FocusRequest};
pub use keyboard::{FocusChange, Key, KeyOutcome, KeyPress, TextField};
pub use session::EditorSession;
