//! Garden systems (FixedUpdate, chained)

pub mod commands;
pub mod stage;
pub mod handling;
pub mod proximity;
pub mod tools;
pub mod harvest;

pub use commands::*;
pub use stage::*;
pub use handling::*;
pub use proximity::*;
pub use tools::*;
pub use harvest::*;
