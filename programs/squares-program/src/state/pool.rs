use anchor_lang::prelude::*;

pub const GRID_SIZE: u8 = 10;
pub const MAX_SQUARES: usize = (GRID_SIZE as usize) * (GRID_SIZE as usize);

/// How many prior squares snapshots the undo stack retains on-chain.
pub const UNDO_DEPTH: usize = 1;

pub const DEFAULT_PRICE_PER_SQUARE: u64 = 10;
pub const DEFAULT_HOME_TEAM: &str = "AFC CHAMPIONS";
pub const DEFAULT_AWAY_TEAM: &str = "NFC CHAMPIONS";

pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_TEAM_LEN: usize = 32;
pub const MAX_OWNER_LEN: usize = 24;
pub const MAX_SCORE_LEN: usize = 8;
pub const MAX_HANDLE_LEN: usize = 32;
pub const MAX_PRICE_LEN: usize = 8;
pub const POOL_CODE_LEN: usize = 6;
pub const ADMIN_PIN_LEN: usize = 4;

#[account]
pub struct PoolState {
    pub host: Pubkey,
    pub title: String,
    pub home_team: String,
    pub away_team: String,
    /// Column digits, index -> digit. None until the first roll completes.
    pub home_numbers: Option<[u8; 10]>,
    /// Row digits. Always present/absent together with `home_numbers`.
    pub away_numbers: Option<[u8; 10]>,
    pub squares: Vec<Square>,
    pub history: SnapshotStack,
    pub is_locked: bool,
    pub is_grid_locked: bool,
    pub home_score: String,
    pub away_score: String,
    pub quarter_winners: QuarterWinners,
    pub payment_settings: PaymentSettings,
    pub prize_distribution: PrizeDistribution,
    pub pool_code: String,
    pub admin_pin: String,
    pub is_initialized: bool,
    pub is_paid_pool: bool,
    /// Bumped on full reset; sessions granted under an older epoch carry no capability.
    pub epoch: u32,
    pub randomness_requested: bool,
    pub bump: u8,
}

impl Space for PoolState {
    const INIT_SPACE: usize = 8  // Discriminator
        + 32                                        // host: Pubkey
        + 4 + MAX_TITLE_LEN                         // title: String
        + 4 + MAX_TEAM_LEN                          // home_team: String
        + 4 + MAX_TEAM_LEN                          // away_team: String
        + 1 + 10                                    // home_numbers: Option<[u8; 10]>
        + 1 + 10                                    // away_numbers: Option<[u8; 10]>
        + 4 + MAX_SQUARES * Square::SIZE            // squares: Vec<Square>
        + SnapshotStack::SIZE                       // history
        + 1                                         // is_locked: bool
        + 1                                         // is_grid_locked: bool
        + 4 + MAX_SCORE_LEN                         // home_score: String
        + 4 + MAX_SCORE_LEN                         // away_score: String
        + QuarterWinners::SIZE                      // quarter_winners
        + PaymentSettings::SIZE                     // payment_settings
        + PrizeDistribution::SIZE                   // prize_distribution
        + 4 + POOL_CODE_LEN                         // pool_code: String
        + 4 + ADMIN_PIN_LEN                         // admin_pin: String
        + 1                                         // is_initialized: bool
        + 1                                         // is_paid_pool: bool
        + 4                                         // epoch: u32
        + 1                                         // randomness_requested: bool
        + 1; // bump: u8
}

impl PoolState {
    pub fn square_index(&self, row: u8, col: u8) -> Option<usize> {
        self.squares.iter().position(|s| s.row == row && s.col == col)
    }

    pub fn square_at(&self, row: u8, col: u8) -> Option<&Square> {
        self.squares.iter().find(|s| s.row == row && s.col == col)
    }

    /// Back to an empty, unlocked grid: claims, numbers, scores, recorded
    /// winners and the undo history are all wiped. The epoch bump strands
    /// every outstanding session, so everyone authenticates again.
    pub fn apply_full_reset(&mut self) {
        self.home_numbers = None;
        self.away_numbers = None;
        self.squares.clear();
        self.history.clear();
        self.is_locked = false;
        self.is_grid_locked = false;
        self.home_score = String::new();
        self.away_score = String::new();
        self.quarter_winners = QuarterWinners::default();
        self.is_initialized = false;
        self.randomness_requested = false;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

// ============= TYPES =============

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Square {
    pub row: u8,
    pub col: u8,
    pub owner: String,
    pub status: ClaimStatus,
    pub payment_method: Option<PaymentMethod>,
}

impl Square {
    pub const SIZE: usize = 1       // row: u8
        + 1                         // col: u8
        + 4 + MAX_OWNER_LEN         // owner: String
        + 1                         // status: ClaimStatus
        + 1 + 1; // payment_method: Option<PaymentMethod>

    pub fn id(&self) -> String {
        cell_id(self.row, self.col)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    Unpaid,
    Pending,
    Paid,
}

impl ClaimStatus {
    /// Collapses the legacy (is_paid, is_pending) boolean pair. Paid wins,
    /// then pending; both false is an unverified claim.
    pub fn from_flags(is_paid: bool, is_pending: bool) -> Self {
        if is_paid {
            ClaimStatus::Paid
        } else if is_pending {
            ClaimStatus::Pending
        } else {
            ClaimStatus::Unpaid
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, ClaimStatus::Paid)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ClaimStatus::Pending)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    Venmo,
    CashApp,
    Cash,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuarterWinners {
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
}

impl QuarterWinners {
    pub const SIZE: usize = 3 * (1 + 4 + MAX_OWNER_LEN); // three Option<String> owner names

    pub fn get(&self, quarter: Quarter) -> &Option<String> {
        match quarter {
            Quarter::Q1 => &self.q1,
            Quarter::Q2 => &self.q2,
            Quarter::Q3 => &self.q3,
        }
    }

    /// Records `owner` for the quarter. Returns true when a previous record
    /// was overwritten; overwriting is allowed at this layer.
    pub fn record(&mut self, quarter: Quarter, owner: String) -> bool {
        let slot = match quarter {
            Quarter::Q1 => &mut self.q1,
            Quarter::Q2 => &mut self.q2,
            Quarter::Q3 => &mut self.q3,
        };
        let overwrote = slot.is_some();
        *slot = Some(owner);
        overwrote
    }

    pub fn clear(&mut self) {
        self.q1 = None;
        self.q2 = None;
        self.q3 = None;
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentSettings {
    pub venmo: Option<String>,
    pub cash_app: Option<String>,
    pub cash: Option<String>,
    /// Numeric text; anything that fails to parse falls back to
    /// `DEFAULT_PRICE_PER_SQUARE` when the ledger reads it.
    pub price_per_square: String,
}

impl PaymentSettings {
    pub const SIZE: usize = 3 * (1 + 4 + MAX_HANDLE_LEN)    // venmo / cash_app / cash handles
        + 4 + MAX_PRICE_LEN; // price_per_square: String
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrizeDistribution {
    pub q1: u16,
    pub q2: u16,
    pub q3: u16,
    pub finals: u16,
}

impl PrizeDistribution {
    pub const SIZE: usize = 4 * 2; // four u16 percents

    pub fn total(&self) -> u32 {
        self.q1 as u32 + self.q2 as u32 + self.q3 as u32 + self.finals as u32
    }

    /// The four percents are meant to sum to exactly 100. Any other total is
    /// surfaced to the host but never blocks saving or payout math.
    pub fn is_balanced(&self) -> bool {
        self.total() == 100
    }
}

impl Default for PrizeDistribution {
    fn default() -> Self {
        PrizeDistribution { q1: 20, q2: 20, q3: 20, finals: 40 }
    }
}

/// Bounded stack of prior `squares` vectors. A snapshot is pushed before
/// every claim upsert; the oldest entry is evicted past `UNDO_DEPTH`.
/// Discarded wholesale on a full reset.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotStack {
    pub entries: Vec<Vec<Square>>,
}

impl SnapshotStack {
    pub const SIZE: usize = 4 + UNDO_DEPTH * (4 + MAX_SQUARES * Square::SIZE);

    pub fn push(&mut self, snapshot: Vec<Square>) {
        if self.entries.len() >= UNDO_DEPTH {
            self.entries.remove(0);
        }
        self.entries.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<Vec<Square>> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============= PRIZE LEDGER =============

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub total_claimed: u16,
    pub total_paid: u16,
    pub total_pending: u16,
    pub total_pot: u64,
    pub collected: u64,
    pub price: u64,
}

pub fn cell_id(row: u8, col: u8) -> String {
    format!("{}-{}", row, col)
}

/// Integer parse of the price text. Garbage or empty input falls back to the
/// baseline price instead of propagating a parse failure.
pub fn parse_price(text: &str) -> u64 {
    text.trim().parse::<u64>().unwrap_or(DEFAULT_PRICE_PER_SQUARE)
}

/// The pot counts every claim regardless of payment status; `collected`
/// counts verified squares only.
pub fn compute_stats(squares: &[Square], price: u64) -> PoolStats {
    let total_claimed = squares.len() as u16;
    let total_paid = squares.iter().filter(|s| s.status.is_paid()).count() as u16;
    let total_pending = squares.iter().filter(|s| s.status.is_pending()).count() as u16;
    PoolStats {
        total_claimed,
        total_paid,
        total_pending,
        total_pot: (total_claimed as u64).saturating_mul(price),
        collected: (total_paid as u64).saturating_mul(price),
        price,
    }
}

/// Per-bucket payout in cents: pot * percent / 100, two implied decimals.
/// Buckets round independently; their sum may drift from the pot by design
/// of the display layer.
pub fn payout_cents(total_pot: u64, percent: u16) -> u64 {
    total_pot
        .saturating_mul(100)
        .saturating_mul(percent as u64)
        / 100
}

/// Best-effort stats push for the cross-pool directory. Local state is the
/// source of truth; nothing here can roll the mutation back. Only activated
/// pools are listed.
pub fn emit_directory_sync(pool: &PoolState, pool_key: Pubkey) -> Result<()> {
    if !pool.is_paid_pool {
        return Ok(());
    }
    let price = parse_price(&pool.payment_settings.price_per_square);
    let stats = compute_stats(&pool.squares, price);
    emit!(DirectorySynced {
        pool: pool_key,
        pool_code: pool.pool_code.clone(),
        squares_claimed: stats.total_claimed,
        squares_paid: stats.total_paid,
        total_pot: stats.total_pot,
        price_per_square: stats.price,
        is_locked: pool.is_locked,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

// ============= EVENTS =============

#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub host: Pubkey,
    pub title: String,
    pub pool_code: String,
    pub timestamp: i64,
}

#[event]
pub struct PoolActivated {
    pub pool: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct SquareClaimed {
    pub pool: Pubkey,
    pub row: u8,
    pub col: u8,
    pub owner: String,
    pub status: ClaimStatus,
    pub payment_method: Option<PaymentMethod>,
    pub timestamp: i64,
}

#[event]
pub struct SquareDeleted {
    pub pool: Pubkey,
    pub row: u8,
    pub col: u8,
    pub timestamp: i64,
}

#[event]
pub struct SquareVerified {
    pub pool: Pubkey,
    pub row: u8,
    pub col: u8,
    pub status: ClaimStatus,
    pub timestamp: i64,
}

#[event]
pub struct ClaimsRestored {
    pub pool: Pubkey,
    pub restored_count: u16,
    pub timestamp: i64,
}

#[event]
pub struct NumberRollRequested {
    pub pool: Pubkey,
    pub requestor: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct NumbersRolled {
    pub pool: Pubkey,
    pub home_numbers: [u8; 10],
    pub away_numbers: [u8; 10],
    pub reroll: bool,
    pub timestamp: i64,
}

#[event]
pub struct GridLockToggled {
    pub pool: Pubkey,
    pub is_grid_locked: bool,
    pub timestamp: i64,
}

#[event]
pub struct ScoreUpdated {
    pub pool: Pubkey,
    pub home_score: String,
    pub away_score: String,
    pub winning_cell: Option<String>,
    pub timestamp: i64,
}

#[event]
pub struct QuarterWinnerRecorded {
    pub pool: Pubkey,
    pub quarter: Quarter,
    pub owner: String,
    pub overwrote: bool,
    pub timestamp: i64,
}

#[event]
pub struct PaymentSettingsUpdated {
    pub pool: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PrizeDistributionUpdated {
    pub pool: Pubkey,
    pub total_percent: u32,
    pub balanced: bool,
    pub timestamp: i64,
}

#[event]
pub struct PoolCodeRotated {
    pub pool: Pubkey,
    pub pool_code: String,
    pub timestamp: i64,
}

#[event]
pub struct AdminPinChanged {
    pub pool: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct SquaresCleared {
    pub pool: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolReset {
    pub pool: Pubkey,
    pub epoch: u32,
    pub timestamp: i64,
}

#[event]
pub struct DirectorySynced {
    pub pool: Pubkey,
    pub pool_code: String,
    pub squares_claimed: u16,
    pub squares_paid: u16,
    pub total_pot: u64,
    pub price_per_square: u64,
    pub is_locked: bool,
    pub timestamp: i64,
}

// ============= ERRORS =============

#[error_code]
pub enum SquaresError {
    #[msg("Row and column must both be within the 10x10 grid")]
    InvalidCell,

    #[msg("Owner name must not be empty")]
    EmptyOwnerName,

    #[msg("Owner name is too long")]
    OwnerNameTooLong,

    #[msg("A payment method is required")]
    PaymentMethodRequired,

    #[msg("Admin access required")]
    AdminRequired,

    #[msg("Unauthorized action")]
    Unauthorized,

    #[msg("Pool is locked")]
    PoolLocked,

    #[msg("Square is already claimed and payment is in progress or verified")]
    SquareUnavailable,

    #[msg("No claim exists for that square")]
    SquareNotClaimed,

    #[msg("Invalid pool code or admin PIN")]
    InvalidAccessCode,

    #[msg("Session is stale; join the pool again")]
    StaleSession,

    #[msg("Pool code must be 6 uppercase letters or digits")]
    InvalidPoolCode,

    #[msg("Admin PIN must be exactly 4 digits")]
    InvalidAdminPin,

    #[msg("License key format is invalid")]
    InvalidLicenseKey,

    #[msg("Pool is already activated")]
    PoolAlreadyActive,

    #[msg("Lock grid entries before rolling numbers")]
    GridNotLocked,

    #[msg("No number roll is pending")]
    RollNotRequested,

    #[msg("No square wins for the current score")]
    NoWinningSquare,

    #[msg("The winning square has no owner")]
    WinnerNotClaimed,

    #[msg("Nothing to undo")]
    NothingToUndo,

    #[msg("Title must be between 1 and 64 characters")]
    TitleLengthInvalid,

    #[msg("Score text is too long")]
    ScoreTooLong,

    #[msg("Payment handle is too long")]
    HandleTooLong,

    #[msg("Price text is too long")]
    PriceTooLong,

    #[msg("Math overflow error")]
    MathOverflow,
}
