use anchor_lang::prelude::*;

use crate::instructions::initialize::{admin_pin_is_valid, pool_code_is_valid, POOL_SEED, SESSION_SEED};
use crate::state::{
    emit_directory_sync, AdminPinChanged, GridLockToggled, PoolCodeRotated, PoolReset, PoolState,
    PrizeDistribution, PrizeDistributionUpdated, PaymentSettingsUpdated, SessionAccount,
    SquaresCleared, SquaresError, MAX_HANDLE_LEN, MAX_PRICE_LEN, MAX_TITLE_LEN,
};

/// Host-side pool controls share one context; every operation here needs a
/// live admin session and nothing else.
#[derive(Accounts)]
pub struct PoolAdmin<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.host.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, PoolState>,

    #[account(
        seeds = [SESSION_SEED, pool.key().as_ref(), admin.key().as_ref()],
        bump = session.bump,
        constraint = session.is_admin(pool.epoch) @ SquaresError::AdminRequired,
    )]
    pub session: Account<'info, SessionAccount>,
}

impl<'info> PoolAdmin<'info> {
    /// Freezes or reopens claim edits. Independent of whether numbers have
    /// been rolled and toggleable any number of times.
    pub fn toggle_grid_lock(&mut self) -> Result<()> {
        self.pool.is_grid_locked = !self.pool.is_grid_locked;

        emit!(GridLockToggled {
            pool: self.pool.key(),
            is_grid_locked: self.pool.is_grid_locked,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Updates only the handles that are passed; an empty string clears one.
    pub fn update_payment_settings(
        &mut self,
        venmo: Option<String>,
        cash_app: Option<String>,
        cash: Option<String>,
        price_per_square: Option<String>,
    ) -> Result<()> {
        let settings = &mut self.pool.payment_settings;
        let mut price_changed = false;

        if let Some(handle) = venmo {
            require!(handle.len() <= MAX_HANDLE_LEN, SquaresError::HandleTooLong);
            settings.venmo = normalize_handle(handle);
        }
        if let Some(handle) = cash_app {
            require!(handle.len() <= MAX_HANDLE_LEN, SquaresError::HandleTooLong);
            settings.cash_app = normalize_handle(handle);
        }
        if let Some(handle) = cash {
            require!(handle.len() <= MAX_HANDLE_LEN, SquaresError::HandleTooLong);
            settings.cash = normalize_handle(handle);
        }
        if let Some(price) = price_per_square {
            require!(price.len() <= MAX_PRICE_LEN, SquaresError::PriceTooLong);
            price_changed = price != settings.price_per_square;
            settings.price_per_square = price;
        }

        emit!(PaymentSettingsUpdated {
            pool: self.pool.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        // The directory lists the pot at the current price.
        if price_changed {
            emit_directory_sync(&self.pool, self.pool.key())?;
        }

        Ok(())
    }

    pub fn set_title(&mut self, new_title: String) -> Result<()> {
        require!(
            !new_title.trim().is_empty() && new_title.len() <= MAX_TITLE_LEN,
            SquaresError::TitleLengthInvalid
        );
        self.pool.title = new_title;
        Ok(())
    }

    /// The four percents should total 100; any other sum is reported but
    /// saved anyway.
    pub fn update_prize_distribution(&mut self, q1: u16, q2: u16, q3: u16, finals: u16) -> Result<()> {
        let distribution = PrizeDistribution { q1, q2, q3, finals };
        let total = distribution.total();
        let balanced = distribution.is_balanced();
        self.pool.prize_distribution = distribution;

        if !balanced {
            msg!("Prize distribution sums to {}%", total);
        }

        emit!(PrizeDistributionUpdated {
            pool: self.pool.key(),
            total_percent: total,
            balanced,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Previously shared join links stop working the moment the code
    /// changes; sessions that already exist are untouched.
    pub fn rotate_pool_code(&mut self, new_code: String) -> Result<()> {
        require!(pool_code_is_valid(&new_code), SquaresError::InvalidPoolCode);
        self.pool.pool_code = new_code;

        emit!(PoolCodeRotated {
            pool: self.pool.key(),
            pool_code: self.pool.pool_code.clone(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    pub fn set_admin_pin(&mut self, new_pin: String) -> Result<()> {
        require!(admin_pin_is_valid(&new_pin), SquaresError::InvalidAdminPin);
        self.pool.admin_pin = new_pin;

        emit!(AdminPinChanged {
            pool: self.pool.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Wipes claims only; numbers, locks and scores survive.
    pub fn clear_squares(&mut self) -> Result<()> {
        self.pool.squares.clear();

        emit!(SquaresCleared {
            pool: self.pool.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }

    pub fn reset_pool(&mut self) -> Result<()> {
        self.pool.apply_full_reset();

        msg!("Pool reset, epoch {}", self.pool.epoch);

        emit!(PoolReset {
            pool: self.pool.key(),
            epoch: self.pool.epoch,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }
}

/// Empty handles mean "not configured".
fn normalize_handle(handle: String) -> Option<String> {
    let trimmed = handle.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("@host".to_string()), Some("@host".to_string()));
        assert_eq!(normalize_handle(" $host ".to_string()), Some("$host".to_string()));
        assert_eq!(normalize_handle("".to_string()), None);
        assert_eq!(normalize_handle("   ".to_string()), None);
    }
}
