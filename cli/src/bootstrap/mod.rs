pub mod pointer;
pub mod state;
