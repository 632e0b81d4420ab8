pub mod logging;
#[cfg(test)]
pub mod test_utils;
pub mod tracing_setup;
pub mod url;
