mod provider_selector;
#[cfg(test)]
mod tests;

pub use provider_selector::{select, select_from_input};
