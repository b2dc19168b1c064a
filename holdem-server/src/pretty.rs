//! Human-readable console formatting for the server's own log output.
//!
//! Mirrors what the orchestrator already emits as structured `tracing`
//! events — this module exists purely for the operator-facing terminal
//! transcript (colorized when stdout is a tty), not for anything sent to
//! clients.

use owo_colors::OwoColorize;

use holdem_shared::action::{ActionKind, ActionLogEntry, BlindKind};
use holdem_shared::cards::{Card, CardRank, CardSuit};
use holdem_shared::ids::UserId;
use holdem_shared::state::{Seat, TableState};

fn rank_name(rank: CardRank) -> &'static str {
    match rank {
        CardRank::Two => "Two",
        CardRank::Three => "Three",
        CardRank::Four => "Four",
        CardRank::Five => "Five",
        CardRank::Six => "Six",
        CardRank::Seven => "Seven",
        CardRank::Eight => "Eight",
        CardRank::Nine => "Nine",
        CardRank::Ten => "Ten",
        CardRank::Jack => "Jack",
        CardRank::Queen => "Queen",
        CardRank::King => "King",
        CardRank::Ace => "Ace",
    }
}

fn suit_name(suit: CardSuit) -> &'static str {
    match suit {
        CardSuit::Clubs => "Clubs",
        CardSuit::Diamonds => "Diamonds",
        CardSuit::Hearts => "Hearts",
        CardSuit::Spades => "Spades",
    }
}

fn format_card(c: Card, color: bool) -> String {
    let rank = c.rank();
    let suit = c.suit();
    let mut text = format!(
        "{}{} ({} of {})",
        rank.short(),
        suit.icon(),
        rank_name(rank),
        suit_name(suit)
    );
    if color {
        text = match suit {
            CardSuit::Diamonds | CardSuit::Hearts => text.red().to_string(),
            _ => text.to_string(),
        };
    }
    text
}

fn format_cards(cards: &[Card], color: bool) -> String {
    cards
        .iter()
        .map(|&c| format_card(c, color))
        .collect::<Vec<_>>()
        .join(", ")
}

fn seat_label(seats: &[Seat], user_id: &Option<UserId>) -> String {
    match user_id {
        Some(uid) => seats
            .iter()
            .find(|s| s.user_id.as_ref() == Some(uid))
            .map(|s| format!("seat {} ({})", s.seat_id, uid))
            .unwrap_or_else(|| uid.to_string()),
        None => "table".to_string(),
    }
}

/// One line per `ActionLogEntry`, in the style the teacher's `pretty.rs`
/// prints to the server console as each action lands.
pub fn format_action_entry(entry: &ActionLogEntry, seats: &[Seat], color: bool) -> String {
    let who = seat_label(seats, &entry.user_id);
    match &entry.kind {
        ActionKind::PostBlind { kind, amount } => {
            let label = match kind {
                BlindKind::SmallBlind => "SB",
                BlindKind::BigBlind => "BB",
            };
            format!("{} {} posts {}", label, who, amount)
        }
        ActionKind::PostAnte { amount } => format!("ANTE {} posts {}", who, amount),
        ActionKind::Fold => format!(
            "{} {} (fold)",
            if color { "↩".red().to_string() } else { "FOLD".into() },
            who
        ),
        ActionKind::Check => format!(
            "{} {} (check)",
            if color { "✓".green().to_string() } else { "CHECK".into() },
            who
        ),
        ActionKind::Call { amount } => format!(
            "{} {} {} (call)",
            if color { "↪".cyan().to_string() } else { "CALL".into() },
            who,
            amount
        ),
        ActionKind::Bet { amount } => format!(
            "{} {} {} (bet)",
            if color { "●".yellow().to_string() } else { "BET".into() },
            who,
            amount
        ),
        ActionKind::Raise { to, by } => format!(
            "{} {} to {} (+{}) (raise)",
            if color { "▲".magenta().to_string() } else { "RAISE".into() },
            who,
            to,
            by
        ),
        ActionKind::AllIn { amount } => format!(
            "{} {} {} (all-in)",
            if color { "★".bright_red().to_string() } else { "ALL_IN".into() },
            who,
            amount
        ),
    }
}

/// Printed once a hand deals, mirroring the teacher's `format_table_header`.
pub fn format_table_header(state: &TableState, small_blind: u64, big_blind: u64, color: bool) -> String {
    let mut out = String::new();
    let title = if color {
        "=== New Hand ===".bold().blue().to_string()
    } else {
        "=== New Hand ===".to_string()
    };
    let blinds = if color {
        format!("{} SB {} / BB {}", "Blinds:".bold().yellow(), small_blind, big_blind)
    } else {
        format!("Blinds: SB {} / BB {}", small_blind, big_blind)
    };
    out.push_str(&format!("{}\n{}\n", title, blinds));
    out.push_str("Seats:\n");
    let turn = state.hand.as_ref().map(|h| h.turn);
    for seat in &state.seats {
        let Some(user_id) = &seat.user_id else { continue };
        let to_act_icon = if Some(seat.seat_id) == turn {
            if color { " ●".green().to_string() } else { " *".to_string() }
        } else {
            String::new()
        };
        let to_act_text = if Some(seat.seat_id) == turn { " (to act)" } else { "" };
        out.push_str(&format!(
            "  seat {} {}  stack={}{}{}\n",
            seat.seat_id, user_id, seat.stack, to_act_icon, to_act_text
        ));
    }
    out
}

/// Full-table dump used for the console transcript; not sent to clients.
pub fn format_state_human(state: &TableState, color: bool) -> String {
    let mut out = String::new();

    let Some(hand) = &state.hand else {
        return "(no hand in progress)\n".to_string();
    };

    let stage = format!("{:?}", hand.street);
    let stage_s = if color { stage.bold().blue().to_string() } else { stage };
    let total_pot: u64 = hand.pots.iter().map(|p| p.amount).sum();
    let pot_s = if color {
        format!("{} {}", "Pot:".bold().yellow(), total_pot)
    } else {
        format!("Pot: {}", total_pot)
    };
    out.push_str(&format!("{}  |  {}\n", stage_s, pot_s));

    if !hand.community_cards.is_empty() {
        out.push_str(&format!("Board: [{}]\n", format_cards(&hand.community_cards, color)));
    }
    for seat in &state.seats {
        if let Some(cards) = seat.hole_cards {
            if let Some(uid) = &seat.user_id {
                out.push_str(&format!("{}'s cards: [{}]\n", uid, format_cards(&cards, color)));
            }
        }
    }

    out.push_str("Seats:\n");
    for seat in &state.seats {
        let Some(user_id) = &seat.user_id else { continue };
        let to_act_icon = if seat.seat_id == hand.turn {
            if color { " ●".green().to_string() } else { " *".to_string() }
        } else {
            String::new()
        };
        let to_act_text = if seat.seat_id == hand.turn { " (to act)" } else { "" };
        out.push_str(&format!(
            "  seat {} {}  stack={}{}{}\n",
            seat.seat_id, user_id, seat.stack, to_act_icon, to_act_text
        ));
    }

    if !hand.actions.is_empty() {
        out.push_str("\nLog:\n");
        for entry in &hand.actions {
            out.push_str(&format!("  {}\n", format_action_entry(entry, &state.seats, color)));
        }
    }

    out
}
