//! Workspace root crate. Carries the shared git-hook tooling; all real code
//! lives in `crates/`.
