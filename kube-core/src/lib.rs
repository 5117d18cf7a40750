//! Shared apimachinery types: GVK/GVR, the dynamic object model, discovery
//! descriptors, request options, label selectors, and response envelopes.
//!
//! This crate has no client and no server in it; it is the vocabulary both
//! sides of the emulator share, following the same split the types were
//! ported from.

pub mod api_resource;
pub use api_resource::ApiResource;

pub mod dynamic;
pub use dynamic::DynamicObject;

pub mod gvk;
pub use gvk::{GroupVersion, GroupVersionKind, GroupVersionResource, ParseGroupVersionError};

pub mod labels;
pub use labels::{Expression, ParseSelectorError, Selector};

pub mod metadata;
pub use metadata::TypeMeta;

pub mod params;

mod resource;
pub use resource::{Resource, ResourceExt};

pub mod response;
pub use response::{Status, StatusCause, StatusDetails};

pub mod scope;

mod error;
pub use error::{Error, ErrorResponse};
/// Convenience result alias using this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod version;
pub use version::Version;
