//! Core types for typepatch: function records, the Python extractor, and the annotation auditor.

pub mod audit;
mod error;
pub mod extract;
pub mod function;

pub use audit::{CheckMatcher, CheckRegistry, Verdict, has_typed_params};
pub use error::ExtractError;
pub use extract::Extractor;
pub use function::{
    ArgShape, CallSite, Callee, FunctionRecord, KeywordArg, LineSpan, ParamKind, Parameter,
};
