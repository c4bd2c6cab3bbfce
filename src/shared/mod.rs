pub mod constants;
pub mod locale;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
