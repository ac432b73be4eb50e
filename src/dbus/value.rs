//! Bus value types
//!
//! Property values are `zvariant` values, so they go on the wire as they are.

use std::collections::HashMap;

use zvariant::OwnedValue;

/// Property dictionary (`a{sv}`)
pub type PropertyBag = HashMap<String, OwnedValue>;

/// One `(o, a{sv})` entry as returned by `GetPCMs` and carried by `PCMAdded`
pub type PathProperties = (String, PropertyBag);

/// Reply to a method call
#[derive(Debug, PartialEq)]
pub enum MethodReply {
    /// `a{oa{sv}}`
    ObjectDict(Vec<PathProperties>),
}

impl MethodReply {
    /// Entries of an object dictionary reply
    pub fn into_object_dict(self) -> Vec<PathProperties> {
        match self {
            MethodReply::ObjectDict(entries) => entries,
        }
    }
}
