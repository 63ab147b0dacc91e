//! Table operations, one module of `impl Database` blocks per table

mod notes;
