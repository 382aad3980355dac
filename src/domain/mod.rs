// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust types that describe the accident data itself.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One row of the accident table
pub mod record;

// Typed errors raised while reading and preparing the data
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
