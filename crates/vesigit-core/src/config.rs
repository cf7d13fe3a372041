//! The core never parses a hierarchical configuration file itself (that
//! syntax is an external collaborator's concern, §1/§6). It only ever needs
//! a name and an email, so the boundary is a one-method-per-field trait the
//! embedding application implements however it likes.

/// Supplies the two identity fields the commit and annotated-tag writers
/// need. A `None` for either half is a [`crate::error::Error::MissingIdentity`]
/// at the point a commit or tag is written — reads never consult this trait.
pub trait Identity {
    fn user_name(&self) -> Option<&str>;
    fn user_email(&self) -> Option<&str>;
}

/// An identity that is always absent. Useful for read-only operations
/// (status, cat-file, ls-tree, checkout) that never need one.
pub struct NullIdentity;

impl Identity for NullIdentity {
    fn user_name(&self) -> Option<&str> {
        None
    }

    fn user_email(&self) -> Option<&str> {
        None
    }
}

/// A fixed, already-resolved identity. Used by callers (including tests)
/// that already know the name and email.
pub struct StaticIdentity {
    name: String,
    email: String,
}

impl StaticIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        StaticIdentity {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Identity for StaticIdentity {
    fn user_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn user_email(&self) -> Option<&str> {
        Some(&self.email)
    }
}

/// Format an identity as Git's `"{name} <{email}>"`, or `None` if either
/// half is missing.
pub fn format_identity(identity: &dyn Identity) -> Option<String> {
    match (identity.user_name(), identity.user_email()) {
        (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
        _ => None,
    }
}
