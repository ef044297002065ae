// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the system:
//
//   Record  -> one row read from an .npy file
//   Sample  -> one 128x3 motion window with its class label
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A raw labelled row as it comes out of a data file
pub mod record;

// A fixed-size motion window ready for batching
pub mod sample;

// Typed errors raised while shaping raw rows into samples
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
