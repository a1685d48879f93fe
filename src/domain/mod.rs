// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing the core concepts:
// forecast runs, surface observations, and the feature schema
// shared between the transform stage and the model.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain structs, enums, and traits
//
// Keeping this layer pure means every rule of the data model
// can be unit tested without a GPU or any archive on disk.

// One NWP model initialization and its hourly extract rows
pub mod run;

// A ground-truth temperature report and the time-sorted archive index
pub mod observation;

// The missing-value sentinel and the ordered feature schema
pub mod schema;

// Core abstractions (traits) that the data layer implements
pub mod traits;
