use mahjong_scorekeeper::scoring::{
    BonusKind, BonusUnits, MatchSession, MatchSetup, PlayerId, PullMultiplier, WinningClaim,
};

// ============================================================================
// Match Scenario Builder
// ============================================================================

/// Plays a scripted sequence of events into a fresh session.
///
/// Every step unwraps, so a scenario that hits an engine error fails the test
/// at the step that caused it.
pub struct MatchBuilder {
    setup: MatchSetup,
    steps: Vec<Step>,
}

enum Step {
    SelfDraw(PlayerId, u32),
    Discard(PlayerId, Vec<(PlayerId, u32)>),
    Bonus(PlayerId, BonusKind, BonusUnits),
    Stalemate,
    Surrender(bool),
}

#[allow(dead_code)]
impl MatchBuilder {
    pub fn new() -> Self {
        Self {
            setup: MatchSetup::new()
                .with_player_name(1, "Alice")
                .with_player_name(2, "Bob")
                .with_player_name(3, "Charlie")
                .with_player_name(4, "Dana"),
            steps: vec![],
        }
    }

    pub fn with_dealer(mut self, id: PlayerId) -> Self {
        self.setup = self.setup.with_dealer(id);
        self
    }

    pub fn with_pull_multiplier(mut self, multiplier: PullMultiplier) -> Self {
        self.setup = self.setup.with_pull_multiplier(multiplier);
        self
    }

    pub fn with_seating(mut self, seating: [PlayerId; 4]) -> Self {
        self.setup = self.setup.with_seating(seating);
        self
    }

    pub fn self_draw(mut self, winner: PlayerId, fan: u32) -> Self {
        self.steps.push(Step::SelfDraw(winner, fan));
        self
    }

    pub fn discard(mut self, discarder: PlayerId, winners: &[(PlayerId, u32)]) -> Self {
        self.steps.push(Step::Discard(discarder, winners.to_vec()));
        self
    }

    pub fn bonus(mut self, player: PlayerId, units: BonusUnits) -> Self {
        self.steps.push(Step::Bonus(player, BonusKind::Bonus, units));
        self
    }

    pub fn penalty(mut self, player: PlayerId, units: BonusUnits) -> Self {
        self.steps.push(Step::Bonus(player, BonusKind::Penalty, units));
        self
    }

    pub fn stalemate(mut self) -> Self {
        self.steps.push(Step::Stalemate);
        self
    }

    /// Answers the surrender question raised by the previous step.
    pub fn answer_surrender(mut self, accept: bool) -> Self {
        self.steps.push(Step::Surrender(accept));
        self
    }

    pub fn play(self) -> MatchSession {
        let mut session = MatchSession::new(self.setup.build().unwrap());
        for step in self.steps {
            match step {
                Step::SelfDraw(winner, fan) => {
                    session.apply_self_draw_win(winner, fan).unwrap();
                }
                Step::Discard(discarder, winners) => {
                    let claims = winners
                        .into_iter()
                        .map(|(winner_id, fan)| WinningClaim { winner_id, fan })
                        .collect();
                    session.apply_discard_win(discarder, claims).unwrap();
                }
                Step::Bonus(player, kind, units) => {
                    session.apply_bonus_penalty(player, kind, units).unwrap();
                }
                Step::Stalemate => {
                    session.apply_stalemate().unwrap();
                }
                Step::Surrender(accept) => {
                    session.resolve_surrender(accept).unwrap();
                }
            }
        }
        session
    }
}
