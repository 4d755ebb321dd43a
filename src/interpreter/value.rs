/// The `Value` enum and its conversions, truthiness, and display rules.
pub mod core;
/// Host interop: native function signatures and the host-object capability.
pub mod host;
