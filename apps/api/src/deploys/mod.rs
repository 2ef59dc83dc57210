pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod store;
