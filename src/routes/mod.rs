/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules.
/// The split mirrors the three access roles: anyone, authenticated users, and
/// the administrator.
///
/// Unlike a conventional API, protected routes here carry no rejecting auth
/// layer: the `Actor` extractor is infallible and handlers answer unauthorized
/// requests with silent redirects. The module split documents intent; the
/// checks live in the handlers.

/// Routes accessible to all users (anonymous, read-only, plus the identity
/// gateway: register and login).
pub mod public;

/// Routes that act on behalf of a logged-in user. Handlers redirect anonymous
/// actors away instead of rejecting them.
pub mod authenticated;

/// Routes restricted to the administrator account, nested under `/admin`.
pub mod admin;
