//! Tables that map values to the dense indices written in their place.
//!
//! The string, name, and URI indexers live for one component; their
//! contents are written as tables after the libraries. The scope indexers
//! (variables, labels, type parameters) track what is visible at the
//! current point of the descent.

mod names;
mod scope;
mod strings;
mod uris;

pub(crate) use names::NameIndexer;
pub(crate) use scope::{LabelIndexer, TypeParameterIndexer, VariableIndexer};
pub(crate) use strings::StringIndexer;
pub(crate) use uris::UriIndexer;

#[cfg(test)]
mod tests;
