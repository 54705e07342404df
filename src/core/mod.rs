mod account;
mod txn;

pub use account::*;
pub use txn::*;
