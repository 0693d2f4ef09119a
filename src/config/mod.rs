pub mod colors;
pub mod commands;
pub mod history;
pub mod paths;
pub mod state;

pub use colors::CompareColors;
pub use commands::{Entry as CommandEntry, MENU_NAME};
pub use history::History;
pub use paths::{PathFlags, Paths};
pub use state::SavedState;
