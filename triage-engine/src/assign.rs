// triage-engine/src/assign.rs
// Skill-based routing: minimum-cost bipartite matching of tickets onto
// agent capacity slots

use crate::agents::AgentRegistry;
use crate::ticket::{Category, Ticket};
use serde::Serialize;

/// Skill assumed when a category is missing from an agent's skill map, so an
/// unknown category is never free
const DEFAULT_SKILL: f64 = 0.1;

/// Characters of ticket text carried on the assignment record
const PREVIEW_CHARS: usize = 50;

/// One resolved ticket-to-agent pairing
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub ticket_id: String,
    pub category: Category,
    pub agent_name: String,
    pub skill_match: f64,
    pub text_preview: String,
}

/// Map `tickets` onto the registry's free capacity slots, minimizing total
/// cost `1 - skill(category)` over the matching.
///
/// Each agent contributes one slot per unit of remaining capacity. Excess
/// tickets stay unassigned; excess slots stay idle. Matched ticket ids are
/// appended to the parent agent's `assigned` list. Tickets are never removed
/// from the priority queue here.
pub fn route_tickets(registry: &AgentRegistry, tickets: &[Ticket]) -> Vec<Assignment> {
    if tickets.is_empty() {
        return Vec::new();
    }

    let mut agents = registry.lock();

    // expand agents into one slot per free capacity unit
    let mut slot_owner: Vec<usize> = Vec::new();
    for (idx, agent) in agents.iter().enumerate() {
        for _ in 0..agent.remaining_capacity() {
            slot_owner.push(idx);
        }
    }
    if slot_owner.is_empty() {
        return Vec::new();
    }

    let cost_of = |ticket: &Ticket, agent_idx: usize| -> f64 {
        let skill = agents[agent_idx]
            .skills
            .get(&ticket.category)
            .copied()
            .unwrap_or(DEFAULT_SKILL);
        1.0 - skill
    };

    // The solver wants rows <= cols; transpose when tickets outnumber slots
    let pairs: Vec<(usize, usize)> = if tickets.len() <= slot_owner.len() {
        let cost: Vec<Vec<f64>> = tickets
            .iter()
            .map(|ticket| {
                slot_owner
                    .iter()
                    .map(|&agent_idx| cost_of(ticket, agent_idx))
                    .collect()
            })
            .collect();
        hungarian(&cost)
            .into_iter()
            .enumerate()
            .map(|(ticket_idx, slot_idx)| (ticket_idx, slot_idx))
            .collect()
    } else {
        let cost: Vec<Vec<f64>> = slot_owner
            .iter()
            .map(|&agent_idx| {
                tickets
                    .iter()
                    .map(|ticket| cost_of(ticket, agent_idx))
                    .collect()
            })
            .collect();
        let mut pairs: Vec<(usize, usize)> = hungarian(&cost)
            .into_iter()
            .enumerate()
            .map(|(slot_idx, ticket_idx)| (ticket_idx, slot_idx))
            .collect();
        // report assignments in ticket order either way
        pairs.sort_by_key(|(ticket_idx, _)| *ticket_idx);
        pairs
    };

    let mut assignments = Vec::with_capacity(pairs.len());
    for (ticket_idx, slot_idx) in pairs {
        let ticket = &tickets[ticket_idx];
        let agent = &mut agents[slot_owner[slot_idx]];
        agent.assigned.push(ticket.id.clone());

        // first 50 chars with a trailing ellipsis, short text included
        let mut preview: String = ticket.text.chars().take(PREVIEW_CHARS).collect();
        preview.push_str("...");

        assignments.push(Assignment {
            ticket_id: ticket.id.clone(),
            category: ticket.category,
            agent_name: agent.name.clone(),
            skill_match: agent
                .skills
                .get(&ticket.category)
                .copied()
                .unwrap_or(DEFAULT_SKILL),
            text_preview: preview,
        });
    }
    assignments
}

/// Rectangular minimum-cost assignment (Hungarian algorithm with potentials).
///
/// `cost` must have `rows <= cols`; returns for each row the column it is
/// matched to. Deterministic for a fixed input ordering.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let rows = cost.len();
    let cols = cost[0].len();
    debug_assert!(rows <= cols, "hungarian expects rows <= cols");

    // 1-indexed potentials and matching, column 0 is the virtual source
    let mut u = vec![0.0f64; rows + 1];
    let mut v = vec![0.0f64; cols + 1];
    let mut matched_row = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];

    for row in 1..=rows {
        matched_row[0] = row;
        let mut j0 = 0usize;
        let mut min_to = vec![f64::INFINITY; cols + 1];
        let mut used = vec![false; cols + 1];

        loop {
            used[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_to[j] {
                    min_to[j] = reduced;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }

            for j in 0..=cols {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }

            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        // augment along the found path
        loop {
            let j1 = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; rows];
    for j in 1..=cols {
        if matched_row[j] != 0 {
            row_to_col[matched_row[j] - 1] = j - 1;
        }
    }
    row_to_col
}
