use chrono::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Cap for the elapsed-time clock, matching the three-digit counter.
pub const MAX_CLOCK_SECS: u32 = 999;

/// Valid transitions:
/// - AwaitingFirstMove -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Mines are not placed yet; the first reveal decides the excluded cell.
    AwaitingFirstMove,
    InProgress,
    Won,
    Lost,
}

impl GamePhase {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::AwaitingFirstMove)
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::AwaitingFirstMove
    }
}

/// One game from configuration to win or loss.
///
/// Owns the grid for the whole session; a new game means a new session.
/// Mine placement is deferred until the first reveal so that the first
/// revealed cell is never a mine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    field: Option<MineField>,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    phase: GamePhase,
    exploded_at: Option<CellIndex>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self::build(config, seed, None))
    }

    pub fn with_difficulty(difficulty: Difficulty, seed: u64) -> Self {
        Self::build(difficulty.config(), seed, None)
    }

    /// Starts a session over a concrete layout instead of sampling one on
    /// the first reveal. First-move safety is the layout's concern here.
    pub fn with_field(field: MineField) -> Self {
        let config = field.game_config();
        Self::build(config, 0, Some(field))
    }

    fn build(config: GameConfig, seed: u64, field: Option<MineField>) -> Self {
        let board = Array2::default((config.rows as usize, config.cols as usize));
        Self {
            config,
            seed,
            field,
            board,
            revealed_count: 0,
            flagged_count: 0,
            phase: Default::default(),
            exploded_at: None,
            started_at: None,
            ended_at: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_final()
    }

    pub fn size(&self) -> (Coord, Coord) {
        self.config.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// How many mines have not been flagged yet.
    pub fn mines_left(&self) -> CellCount {
        self.config.mines.saturating_sub(self.flagged_count)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn cell_at(&self, index: CellIndex) -> CellState {
        self.board[self.nd(index)]
    }

    pub fn has_mine_at(&self, index: CellIndex) -> bool {
        self.field
            .as_ref()
            .is_some_and(|field| field.contains_mine(index))
    }

    /// The mine the player stepped on, set only on a lost game.
    pub fn exploded_at(&self) -> Option<CellIndex> {
        self.exploded_at
    }

    /// How many seconds have passed since the first reveal, 0 before it,
    /// frozen at the final transition, capped at [`MAX_CLOCK_SECS`].
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            let secs = (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32;
            secs.min(MAX_CLOCK_SECS)
        } else {
            0
        }
    }

    /// Takes all signals queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reveals a cell, flood-filling through its zero-count region.
    ///
    /// Flagged and already-revealed cells are a no-op, as are intents
    /// arriving after the game ended. Out-of-range indices are a caller bug
    /// and rejected without touching any state.
    pub fn reveal(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        let index = self.validate_index(index)?;

        if self.phase.is_final() {
            return Ok(RevealOutcome::NoChange);
        }
        if !matches!(self.board[self.nd(index)], CellState::Hidden) {
            return Ok(RevealOutcome::NoChange);
        }

        self.ensure_started(index);
        Ok(self.reveal_cell(index))
    }

    /// Toggles a flag on a hidden cell, bounded by the mine-count budget.
    pub fn toggle_flag(&mut self, index: CellIndex) -> Result<FlagOutcome> {
        let index = self.validate_index(index)?;

        if self.phase.is_final() {
            return Ok(FlagOutcome::NoChange);
        }

        let nd = self.nd(index);
        Ok(match self.board[nd] {
            CellState::Flagged => {
                self.board[nd] = CellState::Hidden;
                self.flagged_count -= 1;
                self.events.push(GameEvent::CellFlagged {
                    index,
                    flagged: false,
                });
                self.events.push(GameEvent::MineCounterChanged {
                    remaining: self.mines_left(),
                });
                FlagOutcome::Changed
            }
            CellState::Hidden if self.flagged_count < self.config.mines => {
                self.board[nd] = CellState::Flagged;
                self.flagged_count += 1;
                self.events.push(GameEvent::CellFlagged {
                    index,
                    flagged: true,
                });
                self.events.push(GameEvent::MineCounterChanged {
                    remaining: self.mines_left(),
                });
                FlagOutcome::Changed
            }
            // revealed cells, and hidden cells once the budget is spent
            _ => FlagOutcome::NoChange,
        })
    }

    /// Places mines (excluding the first revealed cell) and starts the clock
    /// on the first reveal of the session.
    fn ensure_started(&mut self, index: CellIndex) {
        if self.field.is_none() {
            let field = RejectionPlacer::new(self.seed, index).generate(self.config);
            self.field = Some(field);
        }

        if self.phase.is_initial() {
            let now = Utc::now();
            log::debug!("started at {}", now);
            self.started_at.replace(now);
            self.phase = GamePhase::InProgress;
        }
    }

    fn reveal_cell(&mut self, index: CellIndex) -> RevealOutcome {
        if self.mine_at(index) {
            let nd = self.nd(index);
            self.board[nd] = CellState::Exploded;
            self.exploded_at = Some(index);
            self.events.push(GameEvent::CellRevealed {
                index,
                is_mine: true,
                neighbor_count: 0,
            });
            self.end_game(false);
            return RevealOutcome::Exploded;
        }

        let count = self.count_at(index);
        self.open(index, count);
        log::debug!("revealed cell {}, neighbor mines: {}", index, count);

        if count == 0 {
            let cols = self.config.cols;
            let mut visited = HashSet::from([index]);
            let mut to_visit: VecDeque<_> = self
                .neighbors(index)
                .filter(|&pos| matches!(self.board[to_nd(pos, cols)], CellState::Hidden))
                .collect();

            while let Some(visit) = to_visit.pop_front() {
                if !visited.insert(visit) {
                    continue;
                }

                // flagged cells are fill barriers, revealed cells are done
                if !matches!(self.board[to_nd(visit, cols)], CellState::Hidden) {
                    continue;
                }

                let visit_count = self.count_at(visit);
                self.open(visit, visit_count);
                log::trace!("flood revealed cell {}, neighbor mines: {}", visit, visit_count);

                if visit_count == 0 {
                    to_visit.extend(
                        self.neighbors(visit)
                            .filter(|&pos| {
                                matches!(self.board[to_nd(pos, cols)], CellState::Hidden)
                            })
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        if self.revealed_count == self.field_ref().safe_cell_count() {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn open(&mut self, index: CellIndex, count: u8) {
        let nd = self.nd(index);
        self.board[nd] = CellState::Revealed(count);
        self.revealed_count += 1;
        self.events.push(GameEvent::CellRevealed {
            index,
            is_mine: false,
            neighbor_count: count,
        });
    }

    fn end_game(&mut self, won: bool) {
        // idempotent: the clock stops exactly once
        if self.phase.is_final() {
            return;
        }

        self.phase = if won { GamePhase::Won } else { GamePhase::Lost };
        let now = Utc::now();
        self.ended_at.get_or_insert(now);
        log::debug!("ended at {}, won: {}", now, won);

        self.finish_board(won);

        if won {
            self.events.push(GameEvent::MineCounterChanged {
                remaining: self.mines_left(),
            });
            self.events.push(GameEvent::GameWon {
                elapsed_secs: self.elapsed_secs(),
            });
        } else {
            self.events.push(GameEvent::GameLost);
        }
    }

    /// Final board dressing: auto-flag leftover mines on a win, expose
    /// unflagged mines and wrong flags on a loss. Flagged mines keep their
    /// flag either way.
    fn finish_board(&mut self, won: bool) {
        for index in 0..self.config.total_cells() {
            let has_mine = self.mine_at(index);
            let nd = self.nd(index);
            match self.board[nd] {
                CellState::Hidden if has_mine => {
                    if won {
                        self.board[nd] = CellState::Flagged;
                        self.flagged_count += 1;
                        self.events.push(GameEvent::CellFlagged {
                            index,
                            flagged: true,
                        });
                    } else {
                        self.board[nd] = CellState::Mine;
                    }
                }
                CellState::Flagged if !has_mine => {
                    debug_assert!(!won, "a flagged safe cell cannot survive to a win");
                    self.board[nd] = CellState::WrongFlag;
                }
                _ => {}
            }
        }
    }

    fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if index < self.config.total_cells() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    fn neighbors(&self, index: CellIndex) -> NeighborIter {
        NeighborIter::new(index, self.config.size())
    }

    fn nd(&self, index: CellIndex) -> [usize; 2] {
        to_nd(index, self.config.cols)
    }

    fn field_ref(&self) -> &MineField {
        self.field.as_ref().expect("mine placement precedes reveal")
    }

    fn mine_at(&self, index: CellIndex) -> bool {
        self.field_ref().contains_mine(index)
    }

    fn count_at(&self, index: CellIndex) -> u8 {
        self.field_ref().neighbor_mine_count(index)
    }
}
