use anchor_lang::prelude::*;

/// Fixed cross-pool credential. Grants the pool directory view only, never a
/// capability on any individual pool.
pub const OWNER_ACCESS_CODE: &str = "7777";

#[account]
pub struct SessionAccount {
    pub pool: Pubkey,
    pub participant: Pubkey,
    pub access: AccessLevel,
    /// Pool epoch at grant time. A full pool reset bumps the pool's epoch,
    /// which reverts every outstanding session to no capability.
    pub epoch: u32,
    pub bump: u8,
}

impl Space for SessionAccount {
    const INIT_SPACE: usize = 8  // Discriminator
        + 32    // pool: Pubkey
        + 32    // participant: Pubkey
        + 1     // access: AccessLevel
        + 4     // epoch: u32
        + 1; // bump: u8
}

impl SessionAccount {
    pub fn is_admin(&self, pool_epoch: u32) -> bool {
        self.epoch == pool_epoch && self.access == AccessLevel::Admin
    }

    pub fn can_claim(&self, pool_epoch: u32) -> bool {
        self.epoch == pool_epoch
            && matches!(self.access, AccessLevel::Player | AccessLevel::Admin)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessLevel {
    Player,
    Admin,
    DirectoryOwner,
}

/// Resolves an entered code to a capability. Comparison is trimmed and
/// case-insensitive. The admin PIN is checked before the pool code, then the
/// fixed directory credential. `None` means authentication failed; callers
/// report one generic message that does not reveal which credential missed.
pub fn resolve_access(input: &str, admin_pin: &str, pool_code: &str) -> Option<AccessLevel> {
    let input = input.trim().to_uppercase();
    if input.is_empty() {
        return None;
    }
    if input == admin_pin.trim().to_uppercase() {
        Some(AccessLevel::Admin)
    } else if input == pool_code.trim().to_uppercase() {
        Some(AccessLevel::Player)
    } else if input == OWNER_ACCESS_CODE {
        Some(AccessLevel::DirectoryOwner)
    } else {
        None
    }
}

// ============= EVENTS =============

#[event]
pub struct SessionJoined {
    pub pool: Pubkey,
    pub participant: Pubkey,
    pub access: AccessLevel,
    pub timestamp: i64,
}

#[event]
pub struct SessionClosed {
    pub pool: Pubkey,
    pub participant: Pubkey,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_pin_match() {
        assert_eq!(resolve_access("1234", "1234", "ABC123"), Some(AccessLevel::Admin));
        assert_eq!(resolve_access(" 1234 ", "1234", "ABC123"), Some(AccessLevel::Admin));
    }

    #[test]
    fn test_pool_code_match_is_case_insensitive() {
        assert_eq!(resolve_access("abc123", "1234", "ABC123"), Some(AccessLevel::Player));
        assert_eq!(resolve_access("ABC123", "1234", "ABC123"), Some(AccessLevel::Player));
    }

    #[test]
    fn test_owner_code_grants_directory_view_only() {
        assert_eq!(
            resolve_access("7777", "1234", "ABC123"),
            Some(AccessLevel::DirectoryOwner)
        );
    }

    #[test]
    fn test_pin_checked_before_pool_code() {
        // A pool whose code collides with its PIN still resolves to admin
        assert_eq!(resolve_access("9999", "9999", "9999AB"), Some(AccessLevel::Admin));
    }

    #[test]
    fn test_rejects_unknown_and_empty_input() {
        assert_eq!(resolve_access("WRONG1", "1234", "ABC123"), None);
        assert_eq!(resolve_access("", "1234", "ABC123"), None);
        assert_eq!(resolve_access("   ", "1234", "ABC123"), None);
    }

    #[test]
    fn test_stale_session_has_no_capability() {
        let session = SessionAccount {
            pool: Pubkey::new_unique(),
            participant: Pubkey::new_unique(),
            access: AccessLevel::Admin,
            epoch: 1,
            bump: 255,
        };
        assert!(session.is_admin(1));
        assert!(session.can_claim(1));
        // Epoch bumped by a full reset
        assert!(!session.is_admin(2));
        assert!(!session.can_claim(2));
    }

    #[test]
    fn test_directory_owner_cannot_claim() {
        let session = SessionAccount {
            pool: Pubkey::new_unique(),
            participant: Pubkey::new_unique(),
            access: AccessLevel::DirectoryOwner,
            epoch: 0,
            bump: 255,
        };
        assert!(!session.can_claim(0));
        assert!(!session.is_admin(0));
    }

    #[test]
    fn test_session_space_calculation() {
        assert_eq!(SessionAccount::INIT_SPACE, 78); // 8 + 32 + 32 + 1 + 4 + 1
    }
}
