/// Router Module Index
///
/// Splits the HTTP surface by who may reach it. Access is not enforced here: the
/// admin gate in `auth::admin_gate` is layered over the whole router and guards
/// every `/admin` path.

/// JSON API consumed by the public site and the admin editor.
pub mod public;

/// Admin session endpoints and unfiltered listings, mounted under `/admin`.
pub mod admin;
