//! Account model implementations

use crate::models::Account;

impl Account {
    /// Formatted daily trigger time, e.g. "00:05"
    pub fn schedule_display(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Masked password for API responses
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.len())
    }
}
