use anchor_lang::prelude::*;

use crate::instructions::initialize::{POOL_SEED, SESSION_SEED};
use crate::state::{
    resolve_access, AccessLevel, PoolState, SessionAccount, SessionClosed, SessionJoined,
    SquaresError,
};

#[derive(Accounts)]
pub struct JoinPool<'info> {
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.host.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, PoolState>,

    #[account(
        init_if_needed,
        payer = participant,
        space = SessionAccount::INIT_SPACE,
        seeds = [SESSION_SEED, pool.key().as_ref(), participant.key().as_ref()],
        bump
    )]
    pub session: Account<'info, SessionAccount>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct LeavePool<'info> {
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        seeds = [POOL_SEED, pool.host.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, PoolState>,

    #[account(
        mut,
        close = participant,
        has_one = participant @ SquaresError::Unauthorized,
        seeds = [SESSION_SEED, pool.key().as_ref(), participant.key().as_ref()],
        bump = session.bump
    )]
    pub session: Account<'info, SessionAccount>,
}

impl<'info> JoinPool<'info> {
    pub fn join_pool(&mut self, code: String, bumps: &JoinPoolBumps) -> Result<()> {
        // One generic failure for a miss; do not reveal whether the PIN or
        // the pool code was wrong.
        let access = resolve_access(&code, &self.pool.admin_pin, &self.pool.pool_code)
            .ok_or(SquaresError::InvalidAccessCode)?;

        if access == AccessLevel::Admin {
            self.pool.is_initialized = true;
        }

        self.session.set_inner(SessionAccount {
            pool: self.pool.key(),
            participant: self.participant.key(),
            access,
            epoch: self.pool.epoch,
            bump: bumps.session,
        });

        emit!(SessionJoined {
            pool: self.pool.key(),
            participant: self.participant.key(),
            access,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

impl<'info> LeavePool<'info> {
    /// Sessions never expire on their own; this is the explicit logout. The
    /// `close = participant` constraint returns the session rent.
    pub fn leave_pool(&mut self) -> Result<()> {
        emit!(SessionClosed {
            pool: self.pool.key(),
            participant: self.participant.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }
}
