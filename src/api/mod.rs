pub mod attendance;
pub mod dashboard;
pub mod settings;
pub mod staff;

#[cfg(test)]
pub(crate) mod tests;
