use std::collections::BTreeMap;

use joyrun_common::{CharacterVariant, EntityId};
use joyrun_kernel::{GameEvent, GameSession, GameStatus, ShapeKind};

/// Session inspector for developer tooling.
///
/// Read-only queries against a session for debugging and CLI output.
pub struct SessionInspector;

impl SessionInspector {
    /// Produce a summary of the session state.
    pub fn summary(session: &GameSession) -> SessionSummary {
        SessionSummary {
            status: session.status(),
            character: session.selected_character(),
            score: session.score(),
            high_score: session.high_score(),
            frame: session.frame(),
            seed: session.seed(),
            obstacle_count: session.obstacles().len(),
            vertical: session.body().vertical_position(),
            jumps_remaining: session.body().jumps_remaining(),
            pending_events: session.events().len(),
        }
    }

    pub fn inspect_obstacle(session: &GameSession, id: EntityId) -> Option<ObstacleInfo> {
        session
            .obstacles()
            .iter()
            .find(|o| o.id == id)
            .map(|o| ObstacleInfo {
                id: o.id,
                shape: o.shape,
                position: [o.x, o.y],
                tall: o.is_tall(),
                speed: o.speed,
            })
    }

    /// Live obstacle ids, oldest first.
    pub fn list_obstacles(session: &GameSession) -> Vec<EntityId> {
        session.obstacles().iter().map(|o| o.id).collect()
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub status: GameStatus,
    pub character: CharacterVariant,
    pub score: u32,
    pub high_score: u32,
    pub frame: u64,
    pub seed: u64,
    pub obstacle_count: usize,
    pub vertical: f32,
    pub jumps_remaining: u8,
    pub pending_events: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session: status={} character={} score={} high={} frame={} seed={} obstacles={} y={:.2} jumps={} pending_events={}",
            self.status,
            self.character,
            self.score,
            self.high_score,
            self.frame,
            self.seed,
            self.obstacle_count,
            self.vertical,
            self.jumps_remaining,
            self.pending_events
        )
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleInfo {
    pub id: EntityId,
    pub shape: ShapeKind,
    pub position: [f32; 2],
    pub tall: bool,
    pub speed: f32,
}

impl std::fmt::Display for ObstacleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Obstacle [{}] {:?}{} pos=({:.2}, {:.2}) speed={:.3}",
            self.id.short(),
            self.shape,
            if self.tall { " tall" } else { "" },
            self.position[0],
            self.position[1],
            self.speed
        )
    }
}

/// Counts of drained session events by kind.
#[derive(Debug, Clone, Default)]
pub struct EventTally {
    counts: BTreeMap<&'static str, usize>,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            *self.counts.entry(event_kind(event)).or_default() += 1;
        }
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

impl std::fmt::Display for EventTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "Events: {}", parts.join(" "))
    }
}

/// Stable snake_case name of an event's variant.
pub fn event_kind(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::StatusChanged { .. } => "status_changed",
        GameEvent::CharacterSelected { .. } => "character_selected",
        GameEvent::ObstacleSpawned { .. } => "obstacle_spawned",
        GameEvent::ObstacleDespawned { .. } => "obstacle_despawned",
        GameEvent::Scored { .. } => "scored",
        GameEvent::Jumped { .. } => "jumped",
        GameEvent::Landed => "landed",
        GameEvent::Collided { .. } => "collided",
        GameEvent::HighScoreRaised { .. } => "high_score_raised",
    }
}
