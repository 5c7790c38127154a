use anchor_lang::prelude::*;
use ephemeral_vrf_sdk::anchor::vrf;
use ephemeral_vrf_sdk::instructions::{create_request_randomness_ix, RequestRandomnessParams};
use ephemeral_vrf_sdk::types::SerializableAccountMeta;

use crate::instructions::initialize::{POOL_SEED, SESSION_SEED};
use crate::state::{
    emit_directory_sync, NumberRollRequested, NumbersRolled, PoolState, SessionAccount,
    SquaresError,
};

/// Request a fresh digit assignment for both axes.
#[vrf]
#[derive(Accounts)]
pub struct RequestNumberRoll<'info> {
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

    /// CHECK: The oracle queue from Ephemeral VRF
    #[account(mut, address = ephemeral_vrf_sdk::consts::DEFAULT_QUEUE)]
    pub oracle_queue: AccountInfo<'info>,

    pub system_program: Program<'info, System>,
}

/// Callback from Ephemeral VRF with the roll randomness.
#[derive(Accounts)]
pub struct CallbackRollNumbers<'info> {
    /// CHECK: Must be Ephemeral VRF program identity
    #[account(address = ephemeral_vrf_sdk::consts::VRF_PROGRAM_IDENTITY)]
    pub vrf_program_identity: Signer<'info>,

    #[account(mut)]
    pub pool: Account<'info, PoolState>,
}

impl<'info> RequestNumberRoll<'info> {
    pub fn request_number_roll(&mut self, client_seed: [u8; 32]) -> Result<()> {
        // Numbers only roll once entries are frozen, so a late claim can
        // never race the assignment. Rolling again while locked is a
        // deliberate admin re-roll and replaces both permutations.
        require!(self.pool.is_grid_locked, SquaresError::GridNotLocked);

        self.pool.randomness_requested = true;

        let ix = create_request_randomness_ix(RequestRandomnessParams {
            payer: self.admin.key(),
            oracle_queue: self.oracle_queue.key(),
            callback_program_id: crate::ID,
            // Use the instruction discriminator that Anchor generates
            callback_discriminator: crate::instruction::CallbackRollNumbers::DISCRIMINATOR
                .to_vec(),
            caller_seed: client_seed,
            accounts_metas: Some(vec![SerializableAccountMeta {
                pubkey: self.pool.key(),
                is_signer: false,
                is_writable: true,
            }]),
            ..Default::default()
        });

        self.invoke_signed_vrf(&self.admin.to_account_info(), &ix)?;

        emit!(NumberRollRequested {
            pool: self.pool.key(),
            requestor: self.admin.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

impl<'info> CallbackRollNumbers<'info> {
    pub fn roll_numbers(&mut self, randomness: [u8; 32]) -> Result<()> {
        require!(
            self.pool.randomness_requested,
            SquaresError::RollNotRequested
        );

        let reroll = self.pool.home_numbers.is_some();

        // Disjoint halves of the seed keep the two axes independent.
        let home = shuffled_digits(&randomness[..16]);
        let away = shuffled_digits(&randomness[16..]);

        self.pool.home_numbers = Some(home);
        self.pool.away_numbers = Some(away);
        self.pool.is_locked = true;
        self.pool.is_grid_locked = true;
        self.pool.randomness_requested = false;

        msg!("Numbers rolled (reroll: {})", reroll);

        emit!(NumbersRolled {
            pool: self.pool.key(),
            home_numbers: home,
            away_numbers: away,
            reroll,
            timestamp: Clock::get()?.unix_timestamp,
        });

        emit_directory_sync(&self.pool, self.pool.key())?;
        Ok(())
    }
}

// ============= SHUFFLE =============

/// Fisher-Yates over the digits 0-9, driven by raw seed bytes: for each
/// index from the top down, swap with a seed-chosen index at or below it.
/// Always yields a bijection digit <-> position. Needs at least 9 seed
/// bytes; an empty seed degenerates to the identity order.
pub fn shuffled_digits(seed: &[u8]) -> [u8; 10] {
    let mut digits: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    if seed.is_empty() {
        return digits;
    }
    let mut next = 0usize;
    for i in (1..digits.len()).rev() {
        let j = seed[next % seed.len()] as usize % (i + 1);
        digits.swap(i, j);
        next += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_is_permutation(digits: &[u8; 10]) {
        let mut seen = [false; 10];
        for &d in digits {
            assert!(d < 10, "digit {} out of range", d);
            assert!(!seen[d as usize], "digit {} repeated", d);
            seen[d as usize] = true;
        }
    }

    #[test]
    fn test_every_seed_yields_a_permutation() {
        // Sweep a spread of seed patterns; each must contain 0-9 exactly once
        for base in 0..=255u8 {
            let seed: Vec<u8> = (0u8..16)
                .map(|i| base.wrapping_mul(31).wrapping_add(i.wrapping_mul(7)))
                .collect();
            assert_is_permutation(&shuffled_digits(&seed));
        }
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let seed = [42u8; 16];
        assert_eq!(shuffled_digits(&seed), shuffled_digits(&seed));
    }

    #[test]
    fn test_independent_halves() {
        let randomness: [u8; 32] = core::array::from_fn(|i| (i as u8).wrapping_mul(37));
        let home = shuffled_digits(&randomness[..16]);
        let away = shuffled_digits(&randomness[16..]);
        assert_is_permutation(&home);
        assert_is_permutation(&away);
    }

    #[test]
    fn test_reroll_is_independently_valid() {
        // Two rolls in a row are each valid permutations; equality is not
        // required either way
        let first = shuffled_digits(&[7u8; 16]);
        let second = shuffled_digits(&[201u8; 16]);
        assert_is_permutation(&first);
        assert_is_permutation(&second);
    }

    #[test]
    fn test_empty_seed_degenerates_to_identity() {
        assert_eq!(shuffled_digits(&[]), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }
}
