//! Tournament business logic: bracket and schedule drawing, advancement, settlement, queries.

mod advance;
mod bracket;
mod h2h;
mod round_robin;
mod settlement;
mod view;

pub use advance::{record_result, start_tournament, Advance};
pub use bracket::{build_bracket, pair_by_reflection, Bracket};
pub use h2h::{head_to_head, HeadToHead};
pub use round_robin::{schedule_round_robin, RoundRobinSchedule};
pub use settlement::{
    apply_settlement, compute_outcomes, prepare_settlement, settle_tournament, Outcome,
    Settlement, SettlementWarning,
};
pub use view::{bracket_view, BracketEdge, BracketView, MatchView, RoundView};
