//! Execution Module
//!
//! Routes a validated operation's call from the account to its target.

mod router;


pub use router::ExecutionRouter;
