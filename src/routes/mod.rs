pub mod export;
pub mod pages;
pub mod players;
pub mod state;
pub mod util;
