pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OPERATOR: &str = "operator";
pub const ROLE_VIEWER: &str = "viewer";

/// Well-known roles expected to exist in storage, with their display
/// metadata: (name, display_name, description).
pub const DEFAULT_ROLES: &[(&str, &str, &str)] = &[
    (ROLE_ADMIN, "Administrator", "System administrator with full access"),
    (ROLE_OPERATOR, "Operator", "Database operator able to run operations"),
    (ROLE_VIEWER, "Viewer", "Read-only user"),
];
