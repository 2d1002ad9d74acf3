mod local_db;

pub use local_db::*;
