use anchor_lang::prelude::*;

use crate::instructions::initialize::{POOL_SEED, SESSION_SEED};
use crate::state::{
    cell_id, PoolState, Quarter, QuarterWinnerRecorded, ScoreUpdated, SessionAccount,
    SquaresError, MAX_SCORE_LEN,
};

#[derive(Accounts)]
pub struct UpdateScore<'info> {
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

#[derive(Accounts)]
pub struct RecordQuarterWinner<'info> {
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

impl<'info> UpdateScore<'info> {
    /// Score text is stored verbatim; an empty string means the game is not
    /// live yet. Resolution is recomputed on every tick and shipped with the
    /// event; freezing it into a quarter record is a separate call.
    pub fn update_score(&mut self, home_score: String, away_score: String) -> Result<()> {
        require!(
            home_score.len() <= MAX_SCORE_LEN && away_score.len() <= MAX_SCORE_LEN,
            SquaresError::ScoreTooLong
        );

        self.pool.home_score = home_score;
        self.pool.away_score = away_score;

        let winning_cell = resolve_winning_cell(
            &self.pool.home_score,
            &self.pool.away_score,
            self.pool.home_numbers.as_ref(),
            self.pool.away_numbers.as_ref(),
        )
        .map(|(row, col)| cell_id(row, col));

        emit!(ScoreUpdated {
            pool: self.pool.key(),
            home_score: self.pool.home_score.clone(),
            away_score: self.pool.away_score.clone(),
            winning_cell,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

impl<'info> RecordQuarterWinner<'info> {
    pub fn record_quarter_winner(&mut self, quarter: Quarter) -> Result<()> {
        let (row, col) = resolve_winning_cell(
            &self.pool.home_score,
            &self.pool.away_score,
            self.pool.home_numbers.as_ref(),
            self.pool.away_numbers.as_ref(),
        )
        .ok_or(SquaresError::NoWinningSquare)?;

        let owner = self
            .pool
            .square_at(row, col)
            .map(|s| s.owner.clone())
            .ok_or(SquaresError::WinnerNotClaimed)?;

        // An existing record is silently replaced; the event flags it so the
        // surface can hide the action once a quarter is recorded.
        let overwrote = self.pool.quarter_winners.record(quarter, owner.clone());

        msg!("Quarter winner recorded: {}", owner);

        emit!(QuarterWinnerRecorded {
            pool: self.pool.key(),
            quarter,
            owner,
            overwrote,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

// ============= RESOLUTION =============

/// Maps the current score onto the grid: the last digit of each score is
/// located in its axis permutation, home -> column, away -> row. Any missing
/// permutation, empty score, or non-digit last character means no winner
/// this tick. Pure in its inputs and independent of claim state.
pub fn resolve_winning_cell(
    home_score: &str,
    away_score: &str,
    home_numbers: Option<&[u8; 10]>,
    away_numbers: Option<&[u8; 10]>,
) -> Option<(u8, u8)> {
    let home_numbers = home_numbers?;
    let away_numbers = away_numbers?;
    let home_digit = last_digit(home_score)?;
    let away_digit = last_digit(away_score)?;
    let col = home_numbers.iter().position(|&d| d == home_digit)?;
    let row = away_numbers.iter().position(|&d| d == away_digit)?;
    Some((row as u8, col as u8))
}

fn last_digit(score: &str) -> Option<u8> {
    score.chars().last()?.to_digit(10).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERS: [u8; 10] = [5, 3, 8, 1, 9, 0, 2, 7, 4, 6];

    #[test]
    fn test_resolves_last_digit_lookup() {
        // home "21" -> 1 -> column 3; away "14" -> 4 -> row 8
        let cell = resolve_winning_cell("21", "14", Some(&NUMBERS), Some(&NUMBERS));
        assert_eq!(cell, Some((8, 3)));
        assert_eq!(cell.map(|(r, c)| cell_id(r, c)).unwrap(), "8-3");
    }

    #[test]
    fn test_multi_digit_scores_use_last_digit_only() {
        // "105" -> 5 -> column 0; "0" -> 0 -> row 5
        assert_eq!(
            resolve_winning_cell("105", "0", Some(&NUMBERS), Some(&NUMBERS)),
            Some((5, 0))
        );
    }

    #[test]
    fn test_no_winner_before_kickoff() {
        assert_eq!(resolve_winning_cell("", "14", Some(&NUMBERS), Some(&NUMBERS)), None);
        assert_eq!(resolve_winning_cell("21", "", Some(&NUMBERS), Some(&NUMBERS)), None);
        assert_eq!(resolve_winning_cell("", "", Some(&NUMBERS), Some(&NUMBERS)), None);
    }

    #[test]
    fn test_no_winner_without_numbers() {
        assert_eq!(resolve_winning_cell("21", "14", None, Some(&NUMBERS)), None);
        assert_eq!(resolve_winning_cell("21", "14", Some(&NUMBERS), None), None);
        assert_eq!(resolve_winning_cell("21", "14", None, None), None);
    }

    #[test]
    fn test_non_digit_score_yields_no_winner() {
        assert_eq!(resolve_winning_cell("OT", "14", Some(&NUMBERS), Some(&NUMBERS)), None);
        assert_eq!(resolve_winning_cell("21", "1x", Some(&NUMBERS), Some(&NUMBERS)), None);
        assert_eq!(resolve_winning_cell("21 ", "14", Some(&NUMBERS), Some(&NUMBERS)), None);
    }

    #[test]
    fn test_resolution_covers_every_digit_pair() {
        for home in 0..10u8 {
            for away in 0..10u8 {
                let cell = resolve_winning_cell(
                    &home.to_string(),
                    &away.to_string(),
                    Some(&NUMBERS),
                    Some(&NUMBERS),
                );
                let (row, col) = cell.expect("every digit pair resolves");
                assert_eq!(NUMBERS[col as usize], home);
                assert_eq!(NUMBERS[row as usize], away);
            }
        }
    }
}
