use anchor_lang::prelude::*;

use crate::state::{
    AccessLevel, PaymentSettings, PoolActivated, PoolCreated, PoolState, PrizeDistribution,
    QuarterWinners, SessionAccount, SnapshotStack, SquaresError, ADMIN_PIN_LEN,
    DEFAULT_AWAY_TEAM, DEFAULT_HOME_TEAM, MAX_PRICE_LEN, MAX_TITLE_LEN, POOL_CODE_LEN,
};

pub const POOL_SEED: &[u8] = b"pool";
pub const SESSION_SEED: &[u8] = b"session";

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(mut)]
    pub host: Signer<'info>,

    #[account(
        init,
        payer = host,
        space = PoolState::INIT_SPACE,
        seeds = [POOL_SEED, host.key().as_ref()],
        bump
    )]
    pub pool: Account<'info, PoolState>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ActivatePool<'info> {
    #[account(mut)]
    pub host: Signer<'info>,

    #[account(
        mut,
        has_one = host @ SquaresError::Unauthorized,
        seeds = [POOL_SEED, pool.host.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, PoolState>,

    #[account(
        init_if_needed,
        payer = host,
        space = SessionAccount::INIT_SPACE,
        seeds = [SESSION_SEED, pool.key().as_ref(), host.key().as_ref()],
        bump
    )]
    pub session: Account<'info, SessionAccount>,

    pub system_program: Program<'info, System>,
}

impl<'info> CreatePool<'info> {
    pub fn create_pool(
        &mut self,
        title: String,
        admin_pin: String,
        pool_code: String,
        price_per_square: String,
        bumps: &CreatePoolBumps,
    ) -> Result<()> {
        require!(
            !title.trim().is_empty() && title.len() <= MAX_TITLE_LEN,
            SquaresError::TitleLengthInvalid
        );
        require!(admin_pin_is_valid(&admin_pin), SquaresError::InvalidAdminPin);
        require!(pool_code_is_valid(&pool_code), SquaresError::InvalidPoolCode);
        require!(
            price_per_square.len() <= MAX_PRICE_LEN,
            SquaresError::PriceTooLong
        );

        // A fresh pool: no numbers, no claims, nothing locked. Activation
        // happens once the host fee clears.
        self.pool.set_inner(PoolState {
            host: self.host.key(),
            title,
            home_team: DEFAULT_HOME_TEAM.to_string(),
            away_team: DEFAULT_AWAY_TEAM.to_string(),
            home_numbers: None,
            away_numbers: None,
            squares: Vec::new(),
            history: SnapshotStack::default(),
            is_locked: false,
            is_grid_locked: false,
            home_score: String::new(),
            away_score: String::new(),
            quarter_winners: QuarterWinners::default(),
            payment_settings: PaymentSettings {
                venmo: None,
                cash_app: None,
                cash: None,
                price_per_square,
            },
            prize_distribution: PrizeDistribution::default(),
            pool_code,
            admin_pin,
            is_initialized: false,
            is_paid_pool: false,
            epoch: 0,
            randomness_requested: false,
            bump: bumps.pool,
        });

        msg!("Pool created, code {}", self.pool.pool_code);

        emit!(PoolCreated {
            pool: self.pool.key(),
            host: self.host.key(),
            title: self.pool.title.clone(),
            pool_code: self.pool.pool_code.clone(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

impl<'info> ActivatePool<'info> {
    /// The format gate for the checkout receipt. Whether a well-formed key is
    /// actually honored is the external verifier's call; it listens for
    /// `PoolActivated`.
    pub fn activate_pool(&mut self, license_key: String, bumps: &ActivatePoolBumps) -> Result<()> {
        require!(!self.pool.is_paid_pool, SquaresError::PoolAlreadyActive);
        require!(
            license_key_is_valid(&license_key),
            SquaresError::InvalidLicenseKey
        );

        self.pool.is_paid_pool = true;
        self.pool.is_initialized = true;

        // Activation doubles as the host's first admin login.
        self.session.set_inner(SessionAccount {
            pool: self.pool.key(),
            participant: self.host.key(),
            access: AccessLevel::Admin,
            epoch: self.pool.epoch,
            bump: bumps.session,
        });

        emit!(PoolActivated {
            pool: self.pool.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

// ============= VALIDATION =============

pub fn admin_pin_is_valid(pin: &str) -> bool {
    pin.len() == ADMIN_PIN_LEN && pin.chars().all(|c| c.is_ascii_digit())
}

pub fn pool_code_is_valid(code: &str) -> bool {
    code.len() == POOL_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Receipt keys look like XXXXXXXX-XXXXXXXX-XXXXXXXX-XXXXXXXX: four groups of
/// eight hex characters, either case.
pub fn license_key_is_valid(key: &str) -> bool {
    let groups: Vec<&str> = key.trim().split('-').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| g.len() == 8 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_pin_validation() {
        assert!(admin_pin_is_valid("1234"));
        assert!(admin_pin_is_valid("0000"));
        assert!(!admin_pin_is_valid("123"));
        assert!(!admin_pin_is_valid("12345"));
        assert!(!admin_pin_is_valid("12a4"));
        assert!(!admin_pin_is_valid(""));
    }

    #[test]
    fn test_pool_code_validation() {
        assert!(pool_code_is_valid("ABC123"));
        assert!(pool_code_is_valid("ZZZZZZ"));
        assert!(pool_code_is_valid("000000"));
        assert!(!pool_code_is_valid("abc123")); // lowercase is never stored
        assert!(!pool_code_is_valid("AB12"));
        assert!(!pool_code_is_valid("ABC1234"));
        assert!(!pool_code_is_valid("ABC-12"));
    }

    #[test]
    fn test_license_key_format() {
        assert!(license_key_is_valid("DEADBEEF-12345678-ABCDEF01-99887766"));
        assert!(license_key_is_valid("deadbeef-12345678-abcdef01-99887766"));
        assert!(license_key_is_valid(" DEADBEEF-12345678-ABCDEF01-99887766 "));
        assert!(!license_key_is_valid("DEADBEEF-12345678-ABCDEF01"));
        assert!(!license_key_is_valid("DEADBEEF-12345678-ABCDEF01-9988776"));
        assert!(!license_key_is_valid("DEADBEEF-12345678-ABCDEF01-9988776G"));
        assert!(!license_key_is_valid(""));
    }
}
