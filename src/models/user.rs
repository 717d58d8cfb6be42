/// One inactive IAM user, parsed from a CSV row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// AWS account the user lives in
    pub account_id: String,
    /// IAM username, often an email address
    pub username: String,
    /// Whole days since the user was last active
    pub inactivity_days: u32,
}

impl UserRecord {
    pub fn new(account_id: impl Into<String>, username: impl Into<String>, inactivity_days: u32) -> Self {
        Self {
            account_id: account_id.into(),
            username: username.into(),
            inactivity_days,
        }
    }

    /// Usernames that look like an email address can be notified
    pub fn has_email_address(&self) -> bool {
        self.username.contains('@')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_email_address() {
        assert!(UserRecord::new("acct-1", "alice@example.com", 10).has_email_address());
        assert!(!UserRecord::new("acct-1", "bob", 10).has_email_address());
    }
}
