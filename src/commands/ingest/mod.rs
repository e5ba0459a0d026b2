pub(crate) const DB_SCHEMA_VERSION: &str = "0.1.0";

mod db_setup;
mod run;
mod seed;
#[cfg(test)]
mod tests;

pub use run::run;

use db_setup::*;
use seed::*;
