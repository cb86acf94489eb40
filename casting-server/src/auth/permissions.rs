use crate::auth::token::Claims;
use std::collections::HashSet;
use std::fmt;

/// The fixed permission vocabulary, one per (verb, resource) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    GetActors,
    PostActors,
    PatchActors,
    DeleteActors,
    GetMovies,
    PostMovies,
    PatchMovies,
    DeleteMovies,
}

impl Permission {
    /// The claim string, e.g. "get:actors"
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetActors => "get:actors",
            Self::PostActors => "post:actors",
            Self::PatchActors => "patch:actors",
            Self::DeleteActors => "delete:actors",
            Self::GetMovies => "get:movies",
            Self::PostMovies => "post:movies",
            Self::PatchMovies => "patch:movies",
            Self::DeleteMovies => "delete:movies",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the permission set granted by the claims.
///
/// A token without a `permissions` claim grants nothing. Strings outside the
/// known vocabulary are kept; they simply never match a route.
pub fn permissions(claims: &Claims) -> HashSet<String> {
    claims
        .permissions
        .as_ref()
        .map(|granted| granted.iter().cloned().collect())
        .unwrap_or_default()
}
