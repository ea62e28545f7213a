//! Role assignment for users who log in through OAuth.

/// Role every OAuth user receives.
pub const USER_ROLE: &str = "user";
/// Role granted to configured admin emails and domains.
pub const ADMIN_ROLE: &str = "admin";

/// Roles for `email`: always `user`, plus `admin` for listed emails or domains.
pub fn assign_roles(email: &str, admin_emails: &[String], admin_domains: &[String]) -> Vec<String> {
    let mut roles = vec![USER_ROLE.to_string()];

    let email = email.trim().to_lowercase();
    let listed = admin_emails.iter().any(|e| e.eq_ignore_ascii_case(&email));
    let in_domain = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| admin_domains.iter().any(|d| d.eq_ignore_ascii_case(domain)));

    if listed || in_domain {
        roles.push(ADMIN_ROLE.to_string());
    }
    roles
}
