// src/module/mod.rs

//! Turning one fake file into route definitions.
//!
//! Bundling and evaluation are external collaborators behind traits: the
//! crate decides *when* to load and what to do with the result, the embedding
//! application decides *how* source text becomes exported values.

pub mod load;

pub use load::{
    load_fake_module, Bundler, ModuleEvaluator, ModuleExports, SourceFileBundler,
};
