pub mod message;
pub mod prompts;
pub mod reducer;
pub mod turn;

pub use message::{Message, Sender};
pub use reducer::{reduce, ChatAction, ChatEffect, ChatState};
pub use turn::{ChatSession, ChatSnapshot, SubmitError, TurnOutcome};

#[cfg(test)]
mod tests;
