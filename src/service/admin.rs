/// Capability check for administrative commands (room management, payment
/// approval). Kept behind a trait so role tables or audit logging can be
/// added without touching the services.
pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, user_id: &str) -> bool;
}

/// Single configured operator, matching by id.
pub struct OwnerPolicy {
    owner_id: String,
}

impl OwnerPolicy {
    pub fn new(owner_id: String) -> Self {
        OwnerPolicy { owner_id }
    }
}

impl AdminPolicy for OwnerPolicy {
    fn is_admin(&self, user_id: &str) -> bool {
        !self.owner_id.is_empty() && user_id == self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_policy_matches_only_the_owner() {
        let policy = OwnerPolicy::new("42".to_string());
        assert!(policy.is_admin("42"));
        assert!(!policy.is_admin("7"));
    }

    #[test]
    fn empty_owner_id_grants_nobody() {
        let policy = OwnerPolicy::new(String::new());
        assert!(!policy.is_admin(""));
        assert!(!policy.is_admin("42"));
    }
}
