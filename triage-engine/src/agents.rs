// triage-engine/src/agents.rs
// Process-wide agent registry consumed by the assignment solver

use crate::ticket::Category;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use triage_config::AgentSpec;

/// A human support agent with a per-category skill vector and a bounded
/// amount of parallel work. Invariant: `assigned.len() <= capacity`.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub skills: HashMap<Category, f64>,
    pub capacity: usize,
    pub assigned: Vec<String>,
}

impl Agent {
    fn from_spec(spec: AgentSpec) -> Self {
        let mut skills = HashMap::new();
        for (name, score) in spec.skills {
            match Category::from_name(&name) {
                Some(category) => {
                    skills.insert(category, score);
                }
                None => {
                    warn!(agent = %spec.id, skill = %name, "Unknown skill category in roster; ignoring");
                }
            }
        }
        Self {
            id: spec.id,
            name: spec.name,
            skills,
            capacity: spec.capacity,
            assigned: Vec::new(),
        }
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.assigned.len())
    }
}

/// Live roster view returned by the agents endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub id: String,
    pub name: String,
    pub skills: BTreeMap<String, f64>,
    pub capacity: usize,
    pub current_load: usize,
    pub assigned: Vec<String>,
}

/// Mutex-guarded agent roster; only the assignment solver mutates it
pub struct AgentRegistry {
    agents: Mutex<Vec<Agent>>,
}

impl AgentRegistry {
    pub fn from_specs(specs: Vec<AgentSpec>) -> Self {
        Self {
            agents: Mutex::new(specs.into_iter().map(Agent::from_spec).collect()),
        }
    }

    pub fn status(&self) -> Vec<AgentStatus> {
        self.agents
            .lock()
            .iter()
            .map(|agent| AgentStatus {
                id: agent.id.clone(),
                name: agent.name.clone(),
                skills: agent
                    .skills
                    .iter()
                    .map(|(category, score)| (category.as_str().to_string(), *score))
                    .collect(),
                capacity: agent.capacity,
                current_load: agent.assigned.len(),
                assigned: agent.assigned.clone(),
            })
            .collect()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Agent>> {
        self.agents.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_config::config::default_roster;

    #[test]
    fn builtin_roster_converts_cleanly() {
        let registry = AgentRegistry::from_specs(default_roster());
        let status = registry.status();
        assert_eq!(status.len(), 4);
        assert_eq!(status[0].id, "A1");
        assert_eq!(status[0].current_load, 0);
        assert!((status[0].skills["Technical"] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn unknown_skill_categories_are_dropped() {
        let spec = AgentSpec {
            id: "A9".to_string(),
            name: "Oddball".to_string(),
            skills: [("Technical".to_string(), 0.5), ("Astrology".to_string(), 0.9)]
                .into_iter()
                .collect(),
            capacity: 1,
        };
        let registry = AgentRegistry::from_specs(vec![spec]);
        let status = registry.status();
        assert_eq!(status[0].skills.len(), 1);
        assert!(status[0].skills.contains_key("Technical"));
    }

    #[test]
    fn remaining_capacity_saturates() {
        let mut agent = Agent::from_spec(AgentSpec {
            id: "A1".to_string(),
            name: "X".to_string(),
            skills: BTreeMap::new(),
            capacity: 1,
        });
        agent.assigned.push("T1".to_string());
        assert_eq!(agent.remaining_capacity(), 0);
    }
}
