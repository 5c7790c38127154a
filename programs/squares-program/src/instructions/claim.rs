use anchor_lang::prelude::*;

use crate::instructions::initialize::{POOL_SEED, SESSION_SEED};
use crate::state::{
    emit_directory_sync, ClaimStatus, ClaimsRestored, PaymentMethod, PoolState, SessionAccount,
    Square, SquareClaimed, SquareDeleted, SquareVerified, SquaresError, GRID_SIZE, MAX_OWNER_LEN,
};

#[derive(Accounts)]
pub struct ClaimSquare<'info> {
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.host.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, PoolState>,

    #[account(
        seeds = [SESSION_SEED, pool.key().as_ref(), participant.key().as_ref()],
        bump = session.bump,
        has_one = participant @ SquaresError::Unauthorized,
    )]
    pub session: Account<'info, SessionAccount>,
}

/// Admin-only square surgery: delete, verification overrides, undo.
#[derive(Accounts)]
pub struct ManageSquare<'info> {
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

impl<'info> ClaimSquare<'info> {
    pub fn claim_square(
        &mut self,
        row: u8,
        col: u8,
        owner: String,
        payment_method: Option<PaymentMethod>,
        forced_status: Option<ClaimStatus>,
    ) -> Result<()> {
        require!(
            self.session.epoch == self.pool.epoch,
            SquaresError::StaleSession
        );
        require!(
            self.session.can_claim(self.pool.epoch),
            SquaresError::Unauthorized
        );
        require!(row < GRID_SIZE && col < GRID_SIZE, SquaresError::InvalidCell);

        let owner = owner.trim().to_uppercase();
        require!(!owner.is_empty(), SquaresError::EmptyOwnerName);
        require!(owner.len() <= MAX_OWNER_LEN, SquaresError::OwnerNameTooLong);

        let is_admin = self.session.is_admin(self.pool.epoch);
        let existing_status = self.pool.square_at(row, col).map(|s| s.status);

        claim_permitted(
            self.pool.is_locked,
            self.pool.is_grid_locked,
            is_admin,
            existing_status,
        )?;

        if !is_admin && forced_status.is_none() {
            require!(payment_method.is_some(), SquaresError::PaymentMethodRequired);
        }
        let status = resolve_claim_status(is_admin, forced_status, existing_status)?;

        // Snapshot before applying so the claim can be unwound.
        let snapshot = self.pool.squares.clone();
        self.pool.history.push(snapshot);

        upsert_square(
            &mut self.pool.squares,
            Square {
                row,
                col,
                owner: owner.clone(),
                status,
                payment_method,
            },
        );

        emit!(SquareClaimed {
            pool: self.pool.key(),
            row,
            col,
            owner,
            status,
            payment_method,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }
}

impl<'info> ManageSquare<'info> {
    pub fn delete_square(&mut self, row: u8, col: u8) -> Result<()> {
        require!(row < GRID_SIZE && col < GRID_SIZE, SquaresError::InvalidCell);

        let index = self
            .pool
            .square_index(row, col)
            .ok_or(SquaresError::SquareNotClaimed)?;
        self.pool.squares.remove(index);

        emit!(SquareDeleted {
            pool: self.pool.key(),
            row,
            col,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }

    /// Direct flag override, used for single edits and for walking the
    /// pending list during payment verification. The legacy boolean pair is
    /// collapsed here; paid wins over pending.
    pub fn verify_square(&mut self, row: u8, col: u8, is_paid: bool, is_pending: bool) -> Result<()> {
        require!(row < GRID_SIZE && col < GRID_SIZE, SquaresError::InvalidCell);

        let status = ClaimStatus::from_flags(is_paid, is_pending);
        let index = self
            .pool
            .square_index(row, col)
            .ok_or(SquaresError::SquareNotClaimed)?;
        self.pool.squares[index].status = status;

        emit!(SquareVerified {
            pool: self.pool.key(),
            row,
            col,
            status,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }

    pub fn undo_claim(&mut self) -> Result<()> {
        let snapshot = self
            .pool
            .history
            .pop()
            .ok_or(SquaresError::NothingToUndo)?;
        let restored_count = snapshot.len() as u16;
        self.pool.squares = snapshot;

        msg!("Restored {} squares from history", restored_count);

        emit!(ClaimsRestored {
            pool: self.pool.key(),
            restored_count,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }
}

// ============= CLAIM RULES =============

/// Lock gates for a claim. A fully locked pool only accepts admin edits; a
/// grid-locked pool still lets players take open cells and overwrite
/// merely-reserved unpaid cells, but never a cell whose payment is pending
/// or verified.
pub fn claim_permitted(
    is_locked: bool,
    is_grid_locked: bool,
    is_admin: bool,
    existing: Option<ClaimStatus>,
) -> Result<()> {
    require!(!is_locked || is_admin, SquaresError::PoolLocked);
    if is_grid_locked && !is_admin {
        if let Some(status) = existing {
            require!(
                !status.is_paid() && !status.is_pending(),
                SquaresError::SquareUnavailable
            );
        }
    }
    Ok(())
}

/// Without a forced status, a re-claim keeps the cell's current status and a
/// fresh claim starts unpaid. Players may force unpaid or pending (the
/// "payment sent" path); only an admin can mark a claim paid.
pub fn resolve_claim_status(
    is_admin: bool,
    forced: Option<ClaimStatus>,
    existing: Option<ClaimStatus>,
) -> Result<ClaimStatus> {
    match forced {
        Some(ClaimStatus::Paid) if !is_admin => err!(SquaresError::AdminRequired),
        Some(status) => Ok(status),
        None => Ok(existing.unwrap_or(ClaimStatus::Unpaid)),
    }
}

/// At most one square per cell: a claim on an occupied cell replaces it.
pub fn upsert_square(squares: &mut Vec<Square>, square: Square) {
    match squares
        .iter_mut()
        .find(|s| s.row == square.row && s.col == square.col)
    {
        Some(slot) => *slot = square,
        None => squares.push(square),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(row: u8, col: u8, owner: &str, status: ClaimStatus) -> Square {
        Square {
            row,
            col,
            owner: owner.to_string(),
            status,
            payment_method: None,
        }
    }

    #[test]
    fn test_upsert_creates_then_replaces() {
        let mut squares = Vec::new();
        upsert_square(&mut squares, square(3, 4, "ALICE", ClaimStatus::Unpaid));
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].owner, "ALICE");
        assert_eq!(squares[0].id(), "3-4");

        // Re-claiming the same cell replaces, never duplicates
        upsert_square(&mut squares, square(3, 4, "BOB", ClaimStatus::Pending));
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].owner, "BOB");
        assert_eq!(squares[0].status, ClaimStatus::Pending);

        upsert_square(&mut squares, square(4, 3, "CARL", ClaimStatus::Unpaid));
        assert_eq!(squares.len(), 2);
    }

    #[test]
    fn test_claim_permitted_open_pool() {
        assert!(claim_permitted(false, false, false, None).is_ok());
        assert!(claim_permitted(false, false, false, Some(ClaimStatus::Paid)).is_ok());
    }

    #[test]
    fn test_locked_pool_is_admin_only() {
        assert!(claim_permitted(true, true, false, None).is_err());
        assert!(claim_permitted(true, true, true, None).is_ok());
        assert!(claim_permitted(true, true, true, Some(ClaimStatus::Paid)).is_ok());
    }

    #[test]
    fn test_grid_lock_still_allows_unpaid_takeover() {
        // Open cell: fine
        assert!(claim_permitted(false, true, false, None).is_ok());
        // Reserved but unpaid: still claimable by players
        assert!(claim_permitted(false, true, false, Some(ClaimStatus::Unpaid)).is_ok());
        // Payment in flight or verified: protected
        assert!(claim_permitted(false, true, false, Some(ClaimStatus::Pending)).is_err());
        assert!(claim_permitted(false, true, false, Some(ClaimStatus::Paid)).is_err());
        // Admin bypasses the grid lock entirely
        assert!(claim_permitted(false, true, true, Some(ClaimStatus::Paid)).is_ok());
    }

    #[test]
    fn test_resolve_claim_status_defaults() {
        assert_eq!(
            resolve_claim_status(false, None, None).unwrap(),
            ClaimStatus::Unpaid
        );
        // Re-claim keeps the current status
        assert_eq!(
            resolve_claim_status(false, None, Some(ClaimStatus::Pending)).unwrap(),
            ClaimStatus::Pending
        );
    }

    #[test]
    fn test_resolve_claim_status_forced() {
        assert_eq!(
            resolve_claim_status(false, Some(ClaimStatus::Pending), None).unwrap(),
            ClaimStatus::Pending
        );
        assert_eq!(
            resolve_claim_status(true, Some(ClaimStatus::Paid), None).unwrap(),
            ClaimStatus::Paid
        );
        // Players cannot self-verify
        assert!(resolve_claim_status(false, Some(ClaimStatus::Paid), None).is_err());
    }
}
