//! Type definitions for JSON Pointer paths.

/// One unescaped step of a path: an object member name or a base-10 array
/// index.
pub type PathStep = String;

/// A path into a document, root first. The empty path is the root itself.
///
/// Steps are stored unescaped; [`format_json_pointer`](crate::format_json_pointer)
/// applies RFC 6901 escaping when the path is rendered.
pub type Path = Vec<PathStep>;
