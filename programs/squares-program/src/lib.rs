#![allow(unexpected_cfgs)]
use anchor_lang::prelude::*;

pub mod instructions;
pub mod state;

use crate::instructions::*;
use crate::state::*;

declare_id!("14SYtvGUHifkTHbgcvrZ9xKMsqeFGCD3rW8qNpZLdsNE");

#[program]
pub mod squares_program {
    use super::*;

    pub fn create_pool(
        ctx: Context<CreatePool>,
        title: String,
        admin_pin: String,
        pool_code: String,
        price_per_square: String,
    ) -> Result<()> {
        ctx.accounts.create_pool(title, admin_pin, pool_code, price_per_square, &ctx.bumps)?;
        Ok(())
    }

    pub fn activate_pool(ctx: Context<ActivatePool>, license_key: String) -> Result<()> {
        ctx.accounts.activate_pool(license_key, &ctx.bumps)?;
        Ok(())
    }

    pub fn join_pool(ctx: Context<JoinPool>, code: String) -> Result<()> {
        ctx.accounts.join_pool(code, &ctx.bumps)?;
        Ok(())
    }

    pub fn leave_pool(ctx: Context<LeavePool>) -> Result<()> {
        ctx.accounts.leave_pool()?;
        Ok(())
    }

    pub fn claim_square(
        ctx: Context<ClaimSquare>,
        row: u8,
        col: u8,
        owner: String,
        payment_method: Option<PaymentMethod>,
        forced_status: Option<ClaimStatus>,
    ) -> Result<()> {
        ctx.accounts.claim_square(row, col, owner, payment_method, forced_status)?;
        Ok(())
    }

    pub fn delete_square(ctx: Context<ManageSquare>, row: u8, col: u8) -> Result<()> {
        ctx.accounts.delete_square(row, col)?;
        Ok(())
    }

    pub fn verify_square(
        ctx: Context<ManageSquare>,
        row: u8,
        col: u8,
        is_paid: bool,
        is_pending: bool,
    ) -> Result<()> {
        ctx.accounts.verify_square(row, col, is_paid, is_pending)?;
        Ok(())
    }

    pub fn undo_claim(ctx: Context<ManageSquare>) -> Result<()> {
        ctx.accounts.undo_claim()?;
        Ok(())
    }

    pub fn request_number_roll(ctx: Context<RequestNumberRoll>, client_seed: [u8; 32]) -> Result<()> {
        ctx.accounts.request_number_roll(client_seed)?;
        Ok(())
    }

    pub fn callback_roll_numbers(ctx: Context<CallbackRollNumbers>, randomness: [u8; 32]) -> Result<()> {
        ctx.accounts.roll_numbers(randomness)?;
        Ok(())
    }

    pub fn update_score(ctx: Context<UpdateScore>, home_score: String, away_score: String) -> Result<()> {
        ctx.accounts.update_score(home_score, away_score)?;
        Ok(())
    }

    pub fn record_quarter_winner(ctx: Context<RecordQuarterWinner>, quarter: Quarter) -> Result<()> {
        ctx.accounts.record_quarter_winner(quarter)?;
        Ok(())
    }

    pub fn set_title(ctx: Context<PoolAdmin>, new_title: String) -> Result<()> {
        ctx.accounts.set_title(new_title)?;
        Ok(())
    }

    pub fn toggle_grid_lock(ctx: Context<PoolAdmin>) -> Result<()> {
        ctx.accounts.toggle_grid_lock()?;
        Ok(())
    }

    pub fn update_payment_settings(
        ctx: Context<PoolAdmin>,
        venmo: Option<String>,
        cash_app: Option<String>,
        cash: Option<String>,
        price_per_square: Option<String>,
    ) -> Result<()> {
        ctx.accounts.update_payment_settings(venmo, cash_app, cash, price_per_square)?;
        Ok(())
    }

    pub fn update_prize_distribution(
        ctx: Context<PoolAdmin>,
        q1: u16,
        q2: u16,
        q3: u16,
        finals: u16,
    ) -> Result<()> {
        ctx.accounts.update_prize_distribution(q1, q2, q3, finals)?;
        Ok(())
    }

    pub fn rotate_pool_code(ctx: Context<PoolAdmin>, new_code: String) -> Result<()> {
        ctx.accounts.rotate_pool_code(new_code)?;
        Ok(())
    }

    pub fn set_admin_pin(ctx: Context<PoolAdmin>, new_pin: String) -> Result<()> {
        ctx.accounts.set_admin_pin(new_pin)?;
        Ok(())
    }

    pub fn clear_squares(ctx: Context<PoolAdmin>) -> Result<()> {
        ctx.accounts.clear_squares()?;
        Ok(())
    }

    pub fn reset_pool(ctx: Context<PoolAdmin>) -> Result<()> {
        ctx.accounts.reset_pool()?;
        Ok(())
    }
}
