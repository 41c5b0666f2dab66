pub mod human;
pub mod user_state;
