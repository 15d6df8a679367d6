#![cfg(unix)]

mod helpers;
mod test_analyze;
mod test_check;
mod test_plugins;
